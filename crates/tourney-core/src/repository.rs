//! Collaborator traits the engine is driven through.
//!
//! The engine owns no storage. An owning service implements these over
//! whatever backend it uses; `tourney-state` ships a redb-backed one.
//! Errors are `anyhow` so any backend error type can flow through.

use crate::types::{BracketAdvancement, Field, Match, RankingScope, Stage, Team, TeamRanking};

/// Read access to the teams, fields and prior matches of a stage.
pub trait TeamRepository {
    /// Teams participating in the stage. For playoff stages the order
    /// is the seed order.
    fn list_teams(&self, stage: &Stage) -> anyhow::Result<Vec<Team>>;

    fn list_fields(&self, stage: &Stage) -> anyhow::Result<Vec<Field>>;

    /// Matches already generated for the stage, in match-number order.
    fn list_matches(&self, stage: &Stage) -> anyhow::Result<Vec<Match>>;
}

/// Receives generated matches for persistence.
pub trait MatchSink {
    /// Persist matches in emission order and return the match number
    /// each one was stored under.
    fn save_matches(&mut self, stage: &Stage, matches: &[Match]) -> anyhow::Result<Vec<u32>>;

    fn save_advancements(
        &mut self,
        stage: &Stage,
        advancements: &[BracketAdvancement],
    ) -> anyhow::Result<()>;
}

/// Accepts computed rankings as upserts keyed by (team, scope).
pub trait RankingSink {
    fn upsert_rankings(
        &mut self,
        scope: &RankingScope,
        rankings: &[TeamRanking],
    ) -> anyhow::Result<()>;
}
