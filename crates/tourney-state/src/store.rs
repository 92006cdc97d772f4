//! StateStore: redb-backed persistence for Tourney.
//!
//! Provides typed operations over stages, rosters, fields, matches,
//! bracket advancements and rankings. All values are JSON-serialized into
//! redb's `&[u8]` value columns. The store supports both on-disk and
//! in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use tourney_core::{
    AllianceColor, BracketAdvancement, Field, Match, MatchSink, PlayoffPlacement, RankingScope,
    RankingSink, Stage, StageType, Team, TeamRanking, TeamRepository,
};
use tourney_schedule::{Bracket, BracketAdvancer, PlayoffRankingFinalizer};

use crate::error::{StateError, StateResult};
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Deserialize every value whose key starts with `prefix`, in key order.
fn scan_prefix<T, R>(table: &R, prefix: &str) -> StateResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut results = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (key, value) = entry.map_err(map_err!(Read))?;
        if key.value().starts_with(prefix) {
            let item: T = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(item);
        }
    }
    Ok(results)
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(STAGES).map_err(map_err!(Table))?;
        txn.open_table(TEAMS).map_err(map_err!(Table))?;
        txn.open_table(FIELDS).map_err(map_err!(Table))?;
        txn.open_table(MATCHES).map_err(map_err!(Table))?;
        txn.open_table(RANKINGS).map_err(map_err!(Table))?;
        txn.open_table(ADVANCEMENTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Stages ─────────────────────────────────────────────────────

    pub fn put_stage(&self, stage: &Stage) -> StateResult<()> {
        let value = serde_json::to_vec(stage).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(STAGES).map_err(map_err!(Table))?;
            table
                .insert(stage.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(stage = %stage.id, "stage stored");
        Ok(())
    }

    pub fn get_stage(&self, stage_id: &str) -> StateResult<Option<Stage>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(STAGES).map_err(map_err!(Table))?;
        match table.get(stage_id).map_err(map_err!(Read))? {
            Some(guard) => {
                let stage: Stage =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(stage))
            }
            None => Ok(None),
        }
    }

    pub fn list_stages(&self) -> StateResult<Vec<Stage>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(STAGES).map_err(map_err!(Table))?;
        scan_prefix(&table, "")
    }

    // ── Rosters and fields ─────────────────────────────────────────

    /// Replace a stage's roster. Order is kept and serves as seed order.
    pub fn put_teams(&self, stage_id: &str, teams: &[Team]) -> StateResult<()> {
        let prefix = format!("{stage_id}/");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
            let stale: Vec<String> = table
                .iter()
                .map_err(map_err!(Read))?
                .filter_map(|entry| {
                    let (key, _) = entry.ok()?;
                    let k = key.value().to_string();
                    k.starts_with(&prefix).then_some(k)
                })
                .collect();
            for key in &stale {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            for (position, team) in teams.iter().enumerate() {
                let value = serde_json::to_vec(team).map_err(map_err!(Serialize))?;
                let key = roster_key(stage_id, position);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(stage = stage_id, teams = teams.len(), "roster stored");
        Ok(())
    }

    pub fn put_fields(&self, stage_id: &str, fields: &[Field]) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(FIELDS).map_err(map_err!(Table))?;
            for field in fields {
                let value = serde_json::to_vec(field).map_err(map_err!(Serialize))?;
                let key = field_key(stage_id, &field.id);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    pub fn teams_for_stage(&self, stage_id: &str) -> StateResult<Vec<Team>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
        scan_prefix(&table, &format!("{stage_id}/"))
    }

    pub fn fields_for_stage(&self, stage_id: &str) -> StateResult<Vec<Field>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(FIELDS).map_err(map_err!(Table))?;
        scan_prefix(&table, &format!("{stage_id}/"))
    }

    // ── Matches ────────────────────────────────────────────────────

    pub fn get_match(&self, stage_id: &str, number: u32) -> StateResult<Option<Match>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
        let key = match_key(stage_id, number);
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let m: Match =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(m))
            }
            None => Ok(None),
        }
    }

    /// Matches of a stage in match-number order.
    pub fn matches_for_stage(&self, stage_id: &str) -> StateResult<Vec<Match>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
        scan_prefix(&table, &format!("{stage_id}:"))
    }

    /// Insert matches after the highest number already stored for the
    /// stage, in order. Returns the numbers assigned.
    pub fn append_matches(&self, stage_id: &str, matches: &[Match]) -> StateResult<Vec<u32>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let numbers = {
            let mut table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
            let existing: Vec<Match> = scan_prefix(&table, &format!("{stage_id}:"))?;
            let mut next = existing.iter().map(|m| m.number).max().unwrap_or(0);

            let mut numbers = Vec::with_capacity(matches.len());
            for m in matches {
                next += 1;
                let mut stored = m.clone();
                stored.number = next;
                let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
                let key = match_key(stage_id, next);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
                numbers.push(next);
            }
            numbers
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(stage = stage_id, count = numbers.len(), "matches appended");
        Ok(numbers)
    }

    /// Complete a match with its alliance totals. Playoff matches require
    /// a winner; qualification matches derive it from the totals.
    pub fn record_result(
        &self,
        stage_id: &str,
        number: u32,
        red: u32,
        blue: u32,
        winner: Option<AllianceColor>,
    ) -> StateResult<Match> {
        let stage = self
            .get_stage(stage_id)?
            .ok_or_else(|| StateError::NotFound(format!("stage {stage_id}")))?;
        let key = match_key(stage_id, number);

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let updated = {
            let mut table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
            let mut m: Match = match table.get(key.as_str()).map_err(map_err!(Read))? {
                Some(guard) => {
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?
                }
                None => return Err(StateError::NotFound(format!("match {key}"))),
            };
            let outcome = match stage.stage_type {
                StageType::Playoff => m.complete(red, blue, winner),
                StageType::RoundRobin | StageType::Swiss => m.record_score(red, blue),
            };
            outcome.map_err(tourney_schedule::ScheduleError::from)?;

            let value = serde_json::to_vec(&m).map_err(map_err!(Serialize))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            m
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, red, blue, winner = ?updated.winner, "match result recorded");
        Ok(updated)
    }

    // ── Brackets ───────────────────────────────────────────────────

    pub fn advancements_for_stage(&self, stage_id: &str) -> StateResult<Vec<BracketAdvancement>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ADVANCEMENTS).map_err(map_err!(Table))?;
        scan_prefix(&table, &format!("{stage_id}:"))
    }

    pub fn load_bracket(&self, stage_id: &str) -> StateResult<Bracket> {
        let stage = self
            .get_stage(stage_id)?
            .ok_or_else(|| StateError::NotFound(format!("stage {stage_id}")))?;
        Ok(Bracket::from_parts(
            stage.rounds,
            stage.teams_per_alliance,
            self.matches_for_stage(stage_id)?,
            self.advancements_for_stage(stage_id)?,
        ))
    }

    /// Route the winners of a completed bracket match into their next
    /// match. The bracket is read and the target match written inside one
    /// write transaction; if anything fails nothing is written.
    pub fn advance_bracket_match(
        &self,
        stage_id: &str,
        number: u32,
    ) -> StateResult<BracketAdvancement> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let advancement = {
            let stage: Stage = {
                let table = txn.open_table(STAGES).map_err(map_err!(Table))?;
                let guard = table
                    .get(stage_id)
                    .map_err(map_err!(Read))?
                    .ok_or_else(|| StateError::NotFound(format!("stage {stage_id}")))?;
                serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?
            };
            let links: Vec<BracketAdvancement> = {
                let table = txn.open_table(ADVANCEMENTS).map_err(map_err!(Table))?;
                scan_prefix(&table, &format!("{stage_id}:"))?
            };

            let mut table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
            let matches: Vec<Match> = scan_prefix(&table, &format!("{stage_id}:"))?;
            let mut bracket =
                Bracket::from_parts(stage.rounds, stage.teams_per_alliance, matches, links);

            let advancement = BracketAdvancer::advance(&mut bracket, number)?;
            let target = bracket
                .get(advancement.target)
                .ok_or_else(|| StateError::NotFound(format!("match {}", advancement.target)))?;
            let value = serde_json::to_vec(target).map_err(map_err!(Serialize))?;
            let key = match_key(stage_id, advancement.target);
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            advancement
        };
        txn.commit().map_err(map_err!(Transaction))?;
        info!(
            stage = stage_id,
            source = number,
            target = advancement.target,
            color = %advancement.color,
            "bracket match advanced"
        );
        Ok(advancement)
    }

    /// Final placements once every bracket match is completed.
    pub fn finalize_playoff(&self, stage_id: &str) -> StateResult<Vec<PlayoffPlacement>> {
        let bracket = self.load_bracket(stage_id)?;
        Ok(PlayoffRankingFinalizer::finalize(&bracket)?)
    }

    // ── Rankings ───────────────────────────────────────────────────

    pub fn put_rankings(&self, scope: &RankingScope, rankings: &[TeamRanking]) -> StateResult<()> {
        let scope_key = scope.key();
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(RANKINGS).map_err(map_err!(Table))?;
            for ranking in rankings {
                let value = serde_json::to_vec(ranking).map_err(map_err!(Serialize))?;
                let key = ranking_key(&scope_key, ranking.team);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(scope = %scope_key, count = rankings.len(), "rankings upserted");
        Ok(())
    }

    /// Rankings of a scope in team order.
    pub fn rankings_for_scope(&self, scope: &RankingScope) -> StateResult<Vec<TeamRanking>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RANKINGS).map_err(map_err!(Table))?;
        scan_prefix(&table, &format!("{}/", scope.key()))
    }
}

// ── Engine collaborators ───────────────────────────────────────────

impl TeamRepository for StateStore {
    fn list_teams(&self, stage: &Stage) -> anyhow::Result<Vec<Team>> {
        Ok(self.teams_for_stage(&stage.id)?)
    }

    fn list_fields(&self, stage: &Stage) -> anyhow::Result<Vec<Field>> {
        Ok(self.fields_for_stage(&stage.id)?)
    }

    fn list_matches(&self, stage: &Stage) -> anyhow::Result<Vec<Match>> {
        Ok(self.matches_for_stage(&stage.id)?)
    }
}

impl MatchSink for StateStore {
    fn save_matches(&mut self, stage: &Stage, matches: &[Match]) -> anyhow::Result<Vec<u32>> {
        Ok(self.append_matches(&stage.id, matches)?)
    }

    fn save_advancements(
        &mut self,
        stage: &Stage,
        advancements: &[BracketAdvancement],
    ) -> anyhow::Result<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ADVANCEMENTS).map_err(map_err!(Table))?;
            for link in advancements {
                let value = serde_json::to_vec(link).map_err(map_err!(Serialize))?;
                let key = match_key(&stage.id, link.source);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl RankingSink for StateStore {
    fn upsert_rankings(
        &mut self,
        scope: &RankingScope,
        rankings: &[TeamRanking],
    ) -> anyhow::Result<()> {
        Ok(self.put_rankings(scope, rankings)?)
    }
}
