//! tourney-core: shared types for the Tourney match-scheduling engine.
//!
//! Holds the domain model (teams, fields, matches, stages, rankings,
//! bracket advancements), the engine configuration file, and the
//! collaborator traits the engine uses to read and persist state.

pub mod config;
pub mod repository;
pub mod types;

pub use config::{EngineConfig, OptimizationTier};
pub use repository::{MatchSink, RankingSink, TeamRepository};
pub use types::*;
