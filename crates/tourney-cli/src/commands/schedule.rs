use std::path::Path;

use tracing::info;
use tourney_core::{EngineConfig, OptimizationTier, Stage, StageType};
use tourney_schedule::StageScheduler;
use tourney_schedule::report::{optimization_summary, schedule_report};

use super::{field_set, open_store, rng, roster};

pub struct ScheduleArgs<'a> {
    pub teams: u32,
    pub rounds: u32,
    pub fields: u32,
    pub tier: Option<OptimizationTier>,
    pub seed: Option<u64>,
    pub config: Option<&'a str>,
    pub format: &'a str,
    pub db: Option<&'a str>,
}

/// Flags win over the config file.
fn load_config(args: &ScheduleArgs<'_>) -> anyhow::Result<EngineConfig> {
    let mut config = match args.config {
        Some(path) => EngineConfig::from_file(Path::new(path))?,
        None => EngineConfig::default(),
    };
    if let Some(tier) = args.tier {
        config.optimizer.tier = tier;
        config.optimizer.max_iterations = None;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

pub fn schedule(args: ScheduleArgs<'_>) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let mut store = open_store(args.db)?;

    let stage = Stage {
        id: "qualification".to_string(),
        tournament_id: Some("cli".to_string()),
        stage_type: StageType::RoundRobin,
        rounds: args.rounds,
        teams_per_alliance: config.schedule.teams_per_alliance,
    };
    store.put_stage(&stage)?;
    store.put_teams(&stage.id, &roster(args.teams))?;
    store.put_fields(&stage.id, &field_set(args.fields))?;

    let mut rng = rng(config.seed);
    let scheduler = StageScheduler::new(config);
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
            let title = format!("Qualification: {} teams, {} rounds", args.teams, args.rounds);
            println!("{}", schedule_report(&title, &output.matches));
            if let (Some(report), Some(breakdown)) = (&output.optimization, &output.breakdown) {
                println!("{}", optimization_summary(report, breakdown));
            }
        }
    }

    Ok(())
}

pub fn init_config(path: &str) -> anyhow::Result<()> {
    let output = Path::new(path);
    std::fs::write(output, EngineConfig::default().to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
