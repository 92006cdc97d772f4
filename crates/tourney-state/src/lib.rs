//! tourney-state: embedded state store for Tourney.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for stages, rosters, fields, matches, bracket advancements and
//! rankings. `StateStore` implements the engine's collaborator traits
//! (`TeamRepository`, `MatchSink`, `RankingSink`), so a `StageScheduler`
//! can run directly against it.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Keys are prefixed by stage id (`{stage}:{number}`, `{stage}/{field}`)
//! so a stage's records come back together from a prefix scan.
//!
//! Bracket advancement reads the bracket and writes the target match
//! inside one write transaction, so two completions can never advance
//! into the same slot concurrently.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use store::StateStore;
