pub mod bracket;
pub mod schedule;
pub mod standings;

use std::path::Path;

use tourney_core::{Field, Team};
use tourney_schedule::{RandomSource, from_entropy, seeded};
use tourney_state::StateStore;

/// Open the store file when given, otherwise a throwaway in-memory store.
pub(crate) fn open_store(db: Option<&str>) -> anyhow::Result<StateStore> {
    let store = match db {
        Some(path) => StateStore::open(Path::new(path))?,
        None => StateStore::open_in_memory()?,
    };
    Ok(store)
}

pub(crate) fn rng(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(seeded(seed)),
        None => Box::new(from_entropy()),
    }
}

/// Teams 1..=count with generated ids.
pub(crate) fn roster(count: u32) -> Vec<Team> {
    (1..=count)
        .map(|index| Team {
            id: format!("team-{index}"),
            index,
            name: format!("Team {index}"),
        })
        .collect()
}

pub(crate) fn field_set(count: u32) -> Vec<Field> {
    (1..=count)
        .map(|i| Field {
            id: format!("field-{i}"),
            name: format!("Field {i}"),
        })
        .collect()
}
