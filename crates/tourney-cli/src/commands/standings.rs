use std::path::Path;

use anyhow::Context;
use tracing::info;
use tourney_core::{EngineConfig, RankingScope, Stage, StageType};
use tourney_schedule::StageScheduler;
use tourney_schedule::report::{placements_report, standings_report};
use tourney_state::StateStore;

fn load_stage(store: &StateStore, stage_id: &str) -> anyhow::Result<Stage> {
    store
        .get_stage(stage_id)?
        .with_context(|| format!("stage '{stage_id}' not found"))
}

/// Recompute and print the standings of a stored stage.
pub fn standings(db: &str, stage_id: &str, format: &str) -> anyhow::Result<()> {
    info!(db, stage = stage_id, "opening store");
    let mut store = StateStore::open(Path::new(db))?;
    let stage = load_stage(&store, stage_id)?;

    let scope = RankingScope::Stage(stage.id.clone());
    let repo = store.clone();
    let standings = StageScheduler::new(EngineConfig::default()).recompute_rankings(
        &scope,
        std::slice::from_ref(&stage),
        &repo,
        &mut store,
    )?;
    info!(stage = %stage.id, teams = standings.len(), "standings updated");

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&standings)?),
        _ => println!("{}", standings_report(&standings)),
    }
    Ok(())
}

/// Print final placements of a completed playoff stage.
pub fn placements(db: &str, stage_id: &str, format: &str) -> anyhow::Result<()> {
    info!(db, stage = stage_id, "opening store");
    let store = StateStore::open(Path::new(db))?;
    let stage = load_stage(&store, stage_id)?;
    if stage.stage_type != StageType::Playoff {
        anyhow::bail!("stage '{stage_id}' is not a playoff");
    }

    let placements = store.finalize_playoff(&stage.id)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&placements)?),
        _ => println!("{}", placements_report(&placements)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stage_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tourney.redb");
        let db = db.to_str().unwrap();
        StateStore::open(Path::new(db)).unwrap();

        let err = standings(db, "quals", "text").unwrap_err();
        assert!(err.to_string().contains("stage 'quals' not found"));
    }

    #[test]
    fn placements_need_a_playoff() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tourney.redb");
        let db = db.to_str().unwrap();
        {
            let store = StateStore::open(Path::new(db)).unwrap();
            store
                .put_stage(&Stage {
                    id: "quals".to_string(),
                    tournament_id: Some("cli".to_string()),
                    stage_type: StageType::RoundRobin,
                    rounds: 2,
                    teams_per_alliance: 2,
                })
                .unwrap();
        }

        let err = placements(db, "quals", "text").unwrap_err();
        assert!(err.to_string().contains("not a playoff"));
    }
}
