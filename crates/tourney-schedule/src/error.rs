//! Scheduling engine error types.

use thiserror::Error;
use tourney_core::{TeamIndex, TransitionError};

/// Errors surfaced by the scheduling engine. All are local validation
/// failures; nothing is retried internally.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("insufficient teams: {available} available, {required} required per match")]
    InsufficientTeams { available: usize, required: usize },

    #[error("no fields available for assignment")]
    EmptyFieldSet,

    #[error("unsupported teams per alliance: {actual} (engine requires {expected})")]
    UnsupportedTeamsPerAlliance { expected: u32, actual: u32 },

    #[error("stage not ready: {0}")]
    StageNotReady(String),

    #[error("match not found: {0}")]
    MatchNotFound(u32),

    #[error("match not completed: {0}")]
    MatchNotCompleted(u32),

    #[error("match {0} has no winning alliance")]
    MissingWinningAlliance(u32),

    #[error("no advancement record for match {0}")]
    NoAdvancementRecord(u32),

    #[error("bracket incomplete: match {0} is not completed")]
    IncompleteBracket(u32),

    #[error("insufficient seeds: {available} available, {required} required")]
    InsufficientSeeds { available: usize, required: usize },

    #[error("seed {seed} has {actual} teams, expected {expected}")]
    MalformedSeed {
        seed: usize,
        expected: u32,
        actual: usize,
    },

    #[error("unknown team index: {0}")]
    UnknownTeam(TeamIndex),

    #[error("invalid match transition: {0}")]
    InvalidTransition(String),

    #[error("repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl From<TransitionError> for ScheduleError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::MissingWinner(number) => ScheduleError::MissingWinningAlliance(number),
            other @ TransitionError::InvalidTransition { .. } => {
                ScheduleError::InvalidTransition(other.to_string())
            }
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
