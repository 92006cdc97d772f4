use tracing::info;
use tourney_core::{EngineConfig, Stage, StageType};
use tourney_schedule::StageScheduler;
use tourney_schedule::report::bracket_report;

use super::{field_set, open_store, rng, roster};

pub struct BracketArgs<'a> {
    pub seeds: u32,
    pub rounds: Option<u32>,
    pub teams_per_alliance: u32,
    pub fields: u32,
    pub seed: Option<u64>,
    pub format: &'a str,
    pub db: Option<&'a str>,
}

/// Largest round count the seeds can fill.
fn rounds_for(seeds: u32) -> u32 {
    if seeds < 2 { 0 } else { seeds.ilog2() }
}

pub fn bracket(args: BracketArgs<'_>) -> anyhow::Result<()> {
    let mut store = open_store(args.db)?;
    let stage = Stage {
        id: "playoff".to_string(),
        tournament_id: Some("cli".to_string()),
        stage_type: StageType::Playoff,
        rounds: args.rounds.unwrap_or_else(|| rounds_for(args.seeds)),
        teams_per_alliance: args.teams_per_alliance,
    };
    store.put_stage(&stage)?;
    store.put_teams(&stage.id, &roster(args.seeds * args.teams_per_alliance))?;
    store.put_fields(&stage.id, &field_set(args.fields))?;

    let mut rng = rng(args.seed);
    let scheduler = StageScheduler::new(EngineConfig::default());
    let repo = store.clone();
    let output = scheduler.generate(&stage, &repo, &mut store, rng.as_mut())?;
    info!(
        stage = %stage.id,
        matches = output.matches.len(),
        db = args.db.unwrap_or("memory"),
        "stage generated"
    );

    match args.format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("{}", bracket_report(&store.load_bracket(&stage.id)?));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_follow_seed_count() {
        assert_eq!(rounds_for(1), 0);
        assert_eq!(rounds_for(2), 1);
        assert_eq!(rounds_for(8), 3);
        assert_eq!(rounds_for(12), 3);
    }
}
