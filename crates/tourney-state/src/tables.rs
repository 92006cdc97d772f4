//! redb table definitions for the Tourney state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).
//! Keys are prefixed by their stage (or ranking scope) so a stage's records
//! come back together from a prefix scan. Numeric key parts are zero-padded
//! to keep them in numeric order.

use redb::TableDefinition;

/// Stages keyed by `{stage_id}`.
pub const STAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("stages");

/// Stage rosters keyed by `{stage_id}/{position:04}`, in seed order.
pub const TEAMS: TableDefinition<&str, &[u8]> = TableDefinition::new("teams");

/// Fields keyed by `{stage_id}/{field_id}`.
pub const FIELDS: TableDefinition<&str, &[u8]> = TableDefinition::new("fields");

/// Matches keyed by `{stage_id}:{number:06}`.
pub const MATCHES: TableDefinition<&str, &[u8]> = TableDefinition::new("matches");

/// Rankings keyed by `{scope}/{team:06}`.
pub const RANKINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("rankings");

/// Bracket advancements keyed by `{stage_id}:{source:06}`.
pub const ADVANCEMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("advancements");

pub fn roster_key(stage_id: &str, position: usize) -> String {
    format!("{stage_id}/{position:04}")
}

pub fn field_key(stage_id: &str, field_id: &str) -> String {
    format!("{stage_id}/{field_id}")
}

pub fn match_key(stage_id: &str, number: u32) -> String {
    format!("{stage_id}:{number:06}")
}

pub fn ranking_key(scope: &str, team: u32) -> String {
    format!("{scope}/{team:06}")
}
