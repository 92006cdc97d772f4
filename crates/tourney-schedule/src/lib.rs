//! tourney-schedule: match scheduling for team competitions.
//!
//! Generates qualification schedules and elimination brackets for a
//! stage and keeps rankings current. The engine owns no storage: it
//! reads and writes through the collaborator traits in `tourney-core`.
//!
//! - Round-robin schedules seeded by rotation (or fewest-appearances
//!   first for uneven team counts), then refined by simulated annealing
//! - Swiss rounds paired from current standings, avoiding repeat opponents
//! - Single-elimination brackets with winner advancement and final placement
//! - Rankings recomputed from scratch on every call
//!
//! # Architecture
//!
//! ```text
//! StageScheduler
//!   ├── TeamRepository (teams, fields, prior matches)
//!   ├── StageStrategy
//!   │   ├── RoundRobinFrc: RoundRobinGenerator → ScheduleOptimizer → FieldBalancer
//!   │   ├── Swiss: RankingCalculator + MatchupHistory → SwissPairingEngine
//!   │   └── Playoff: BracketBuilder → FieldBalancer
//!   ├── MatchSink (matches, bracket links)
//!   └── RankingSink (standings)
//! ```
//!
//! All randomness flows through one injected [`RandomSource`].

pub mod advancer;
pub mod bracket;
pub mod error;
pub mod field_balancer;
pub mod history;
pub mod optimizer;
pub mod random;
pub mod ranking;
pub mod report;
pub mod round_robin;
pub mod scheduler;
pub mod score;
pub mod stats;
pub mod strategy;
pub mod swiss;

pub use advancer::{BracketAdvancer, PlayoffRankingFinalizer};
pub use bracket::{Bracket, BracketBuilder, Seed};
pub use error::{ScheduleError, ScheduleResult};
pub use field_balancer::FieldBalancer;
pub use history::MatchupHistory;
pub use optimizer::{OptimizationReport, ScheduleOptimizer};
pub use random::{RandomSource, from_entropy, seeded, shuffle};
pub use ranking::RankingCalculator;
pub use round_robin::RoundRobinGenerator;
pub use scheduler::StageScheduler;
pub use score::{ScoreBreakdown, Scorer};
pub use stats::{Schedule, ScheduleStats, TeamStats};
pub use strategy::{StageOutput, StagePlan, StageStrategy};
pub use swiss::{SWISS_TEAMS_PER_ALLIANCE, SwissPairingEngine};
