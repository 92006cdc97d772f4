use clap::{Parser, Subcommand};
use tourney_core::OptimizationTier;

mod commands;

#[derive(Parser)]
#[command(
    name = "tourney",
    about = "Tourney: match scheduling for team competitions",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a qualification schedule.
    ///
    /// Builds a round-robin schedule in which every team plays `rounds`
    /// matches, refines it by simulated annealing, and spreads matches
    /// evenly over the fields.
    Schedule {
        /// Number of teams
        #[arg(short, long)]
        teams: u32,
        /// Matches each team plays
        #[arg(short, long, default_value_t = 6)]
        rounds: u32,
        /// Number of fields
        #[arg(long, default_value_t = 1)]
        fields: u32,
        /// Optimizer budget: low, medium or high
        #[arg(long)]
        tier: Option<OptimizationTier>,
        /// RNG seed for a reproducible schedule
        #[arg(long)]
        seed: Option<u64>,
        /// Engine configuration file (tourney.toml)
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Persist the stage to this store file instead of memory
        #[arg(long)]
        db: Option<String>,
    },
    /// Build a single-elimination bracket.
    ///
    /// Alliances are seeded in team order: teams 1..A form seed 1, the
    /// next A teams seed 2, and so on.
    Bracket {
        /// Number of seeded alliances; must be at least 2^rounds
        #[arg(short, long)]
        seeds: u32,
        /// Elimination rounds (default: as many as the seeds fill)
        #[arg(short, long)]
        rounds: Option<u32>,
        /// Teams per alliance
        #[arg(short = 'a', long, default_value_t = 2)]
        teams_per_alliance: u32,
        #[arg(long, default_value_t = 1)]
        fields: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long, default_value = "text")]
        format: String,
        #[arg(long)]
        db: Option<String>,
    },
    /// Recompute and print the standings of a stored stage
    Standings {
        /// Store file written by `schedule --db`
        #[arg(long)]
        db: String,
        #[arg(long, default_value = "qualification")]
        stage: String,
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print final placements once every bracket match has a result
    Placements {
        #[arg(long)]
        db: String,
        #[arg(long, default_value = "playoff")]
        stage: String,
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write a tourney.toml with every default spelled out
    InitConfig {
        #[arg(short, long, default_value = "tourney.toml")]
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tourney=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule {
            teams,
            rounds,
            fields,
            tier,
            seed,
            config,
            format,
            db,
        } => commands::schedule::schedule(commands::schedule::ScheduleArgs {
            teams,
            rounds,
            fields,
            tier,
            seed,
            config: config.as_deref(),
            format: &format,
            db: db.as_deref(),
        }),
        Commands::Bracket {
            seeds,
            rounds,
            teams_per_alliance,
            fields,
            seed,
            format,
            db,
        } => commands::bracket::bracket(commands::bracket::BracketArgs {
            seeds,
            rounds,
            teams_per_alliance,
            fields,
            seed,
            format: &format,
            db: db.as_deref(),
        }),
        Commands::Standings { db, stage, format } => {
            commands::standings::standings(&db, &stage, &format)
        }
        Commands::Placements { db, stage, format } => {
            commands::standings::placements(&db, &stage, &format)
        }
        Commands::InitConfig { path } => commands::schedule::init_config(&path),
    }
}
