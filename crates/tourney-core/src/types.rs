//! Domain types shared by the engine, the store, and the CLI.
//!
//! Teams are addressed inside matches by a dense 1-based [`TeamIndex`];
//! the opaque [`TeamId`] only matters to the owning service. All types
//! serialize to JSON for storage.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier of a team, owned by the surrounding service.
pub type TeamId = String;

/// Dense 1-based team index used for compact storage inside a stage.
pub type TeamIndex = u32;

/// Marks an alliance station left empty, e.g. where a bracket winner's
/// surrogate stood. Never a real team.
pub const OPEN_STATION: TeamIndex = 0;

/// Identifier of a physical field.
pub type FieldId = String;

/// Identifier of a stage within a tournament.
pub type StageId = String;

/// Identifier of a tournament.
pub type TournamentId = String;

// ── Teams and fields ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub index: TeamIndex,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
}

// ── Alliances ─────────────────────────────────────────────────────

/// One side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    pub fn opposite(self) -> Self {
        match self {
            AllianceColor::Red => AllianceColor::Blue,
            AllianceColor::Blue => AllianceColor::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AllianceColor::Red => "RED",
            AllianceColor::Blue => "BLUE",
        }
    }
}

impl fmt::Display for AllianceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Matches ───────────────────────────────────────────────────────

/// Lifecycle of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Rejected match lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("match {number}: cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        number: u32,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("match {0}: completion requires a winning alliance")]
    MissingWinner(u32),
}

/// A scheduled match: two alliances plus result bookkeeping.
///
/// Each alliance is an ordered list of team indices; the position in
/// the list is the station. Surrogates appear in an alliance but their
/// results do not count toward rankings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    /// 1-based, monotonically increasing within a stage.
    pub number: u32,
    pub round: u32,
    pub red: Vec<TeamIndex>,
    pub blue: Vec<TeamIndex>,
    #[serde(default)]
    pub surrogates: BTreeSet<TeamIndex>,
    pub field: Option<FieldId>,
    #[serde(default)]
    pub status: MatchStatus,
    pub red_score: Option<u32>,
    pub blue_score: Option<u32>,
    pub winner: Option<AllianceColor>,
}

impl Match {
    pub fn new(number: u32, round: u32, red: Vec<TeamIndex>, blue: Vec<TeamIndex>) -> Self {
        Self {
            number,
            round,
            red,
            blue,
            surrogates: BTreeSet::new(),
            field: None,
            status: MatchStatus::Pending,
            red_score: None,
            blue_score: None,
            winner: None,
        }
    }

    /// A bracket match whose alliances are filled in later by advancement.
    pub fn placeholder(number: u32, round: u32) -> Self {
        Self::new(number, round, Vec::new(), Vec::new())
    }

    pub fn alliance(&self, color: AllianceColor) -> &[TeamIndex] {
        match color {
            AllianceColor::Red => &self.red,
            AllianceColor::Blue => &self.blue,
        }
    }

    pub fn alliance_mut(&mut self, color: AllianceColor) -> &mut Vec<TeamIndex> {
        match color {
            AllianceColor::Red => &mut self.red,
            AllianceColor::Blue => &mut self.blue,
        }
    }

    /// All teams in station order, RED first.
    pub fn teams(&self) -> impl Iterator<Item = TeamIndex> + '_ {
        self.red.iter().chain(self.blue.iter()).copied()
    }

    pub fn contains(&self, team: TeamIndex) -> bool {
        self.red.contains(&team) || self.blue.contains(&team)
    }

    /// Which alliance a team plays on, if any.
    pub fn alliance_of(&self, team: TeamIndex) -> Option<AllianceColor> {
        if self.red.contains(&team) {
            Some(AllianceColor::Red)
        } else if self.blue.contains(&team) {
            Some(AllianceColor::Blue)
        } else {
            None
        }
    }

    /// Surrogates and open stations both sit outside rankings.
    pub fn is_surrogate(&self, team: TeamIndex) -> bool {
        team == OPEN_STATION || self.surrogates.contains(&team)
    }

    pub fn score(&self, color: AllianceColor) -> Option<u32> {
        match color {
            AllianceColor::Red => self.red_score,
            AllianceColor::Blue => self.blue_score,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Pending → InProgress.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.status != MatchStatus::Pending {
            return Err(self.invalid(MatchStatus::InProgress));
        }
        self.status = MatchStatus::InProgress;
        Ok(())
    }

    /// Complete a qualification match; the winner follows the totals and
    /// equal totals leave no winner (a tie).
    pub fn record_score(&mut self, red: u32, blue: u32) -> Result<(), TransitionError> {
        if self.status == MatchStatus::Completed {
            return Err(self.invalid(MatchStatus::Completed));
        }
        self.red_score = Some(red);
        self.blue_score = Some(blue);
        self.winner = match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Some(AllianceColor::Red),
            std::cmp::Ordering::Less => Some(AllianceColor::Blue),
            std::cmp::Ordering::Equal => None,
        };
        self.status = MatchStatus::Completed;
        Ok(())
    }

    /// Complete a match that must produce a winner (bracket play).
    pub fn complete(
        &mut self,
        red: u32,
        blue: u32,
        winner: Option<AllianceColor>,
    ) -> Result<(), TransitionError> {
        if self.status == MatchStatus::Completed {
            return Err(self.invalid(MatchStatus::Completed));
        }
        let winner = winner.ok_or(TransitionError::MissingWinner(self.number))?;
        self.red_score = Some(red);
        self.blue_score = Some(blue);
        self.winner = Some(winner);
        self.status = MatchStatus::Completed;
        Ok(())
    }

    fn invalid(&self, to: MatchStatus) -> TransitionError {
        TransitionError::InvalidTransition {
            number: self.number,
            from: self.status,
            to,
        }
    }
}

// ── Stages ────────────────────────────────────────────────────────

/// Scheduling strategy a stage runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    /// Fixed multi-round qualification schedule generated in one pass.
    RoundRobin,
    /// Performance-based pairing generated one round at a time.
    Swiss,
    /// Single-elimination bracket.
    Playoff,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub id: StageId,
    /// Stages cannot be scheduled until attached to a tournament.
    pub tournament_id: Option<TournamentId>,
    pub stage_type: StageType,
    /// Appearances per team (round-robin) or elimination rounds (playoff).
    pub rounds: u32,
    pub teams_per_alliance: u32,
}

// ── Rankings ──────────────────────────────────────────────────────

/// What a set of rankings covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RankingScope {
    Stage(StageId),
    Tournament(TournamentId),
}

impl RankingScope {
    /// Stable key used for upserts keyed by (team, scope).
    pub fn key(&self) -> String {
        match self {
            RankingScope::Stage(id) => format!("stage:{id}"),
            RankingScope::Tournament(id) => format!("tournament:{id}"),
        }
    }
}

/// Per-team standing within a scope.
///
/// Ranking points and point differential are derived on demand from the
/// raw counters so they can never disagree with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TeamRanking {
    pub team: TeamIndex,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_scored: u64,
    pub points_conceded: u64,
    /// Mean win rate of all distinct opponents faced.
    pub opponent_win_percentage: f64,
    /// Average alliance score per match played.
    pub tiebreaker_1: f64,
    /// Best single-match alliance score.
    pub tiebreaker_2: f64,
    /// 1-based position once standings are sorted.
    pub rank: Option<u32>,
}

impl TeamRanking {
    pub fn new(team: TeamIndex) -> Self {
        Self {
            team,
            ..Default::default()
        }
    }

    /// 2 per win, 1 per tie.
    pub fn ranking_points(&self) -> u32 {
        2 * self.wins + self.ties
    }

    pub fn point_differential(&self) -> i64 {
        self.points_scored as i64 - self.points_conceded as i64
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.matches_played)
        }
    }
}

// ── Brackets ──────────────────────────────────────────────────────

/// Where the winner of a bracket match is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketAdvancement {
    pub source: u32,
    pub target: u32,
    pub color: AllianceColor,
}

/// Final placement of a team after a bracket completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffPlacement {
    pub team: TeamIndex,
    pub rank: u32,
}
