//! Stage strategies: FRC-style round-robin, Swiss, and playoff.

use serde::Serialize;
use tracing::info;
use tourney_core::{
    BracketAdvancement, EngineConfig, Field, Match, Stage, StageType, Team, TeamIndex,
};

use crate::bracket::{BracketBuilder, Seed};
use crate::error::{ScheduleError, ScheduleResult};
use crate::field_balancer::FieldBalancer;
use crate::history::MatchupHistory;
use crate::optimizer::{OptimizationReport, ScheduleOptimizer};
use crate::random::RandomSource;
use crate::ranking::RankingCalculator;
use crate::round_robin::RoundRobinGenerator;
use crate::score::{ScoreBreakdown, Scorer};
use crate::swiss::{SWISS_TEAMS_PER_ALLIANCE, SwissPairingEngine};

/// How a stage's matches are produced. Chosen by stage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStrategy {
    /// Full qualification schedule in one pass: generate, anneal, assign fields.
    RoundRobinFrc,
    /// One round per call, paired from current standings.
    Swiss,
    /// Single-elimination bracket built once from the seed order.
    Playoff,
}

/// Everything a strategy reads about its stage.
#[derive(Debug, Clone, Copy)]
pub struct StagePlan<'a> {
    pub stage: &'a Stage,
    pub teams: &'a [Team],
    pub fields: &'a [Field],
    /// Matches already generated for the stage, in number order.
    pub prior: &'a [Match],
}

/// What a strategy emits. Match numbers are provisional until the
/// match sink stamps them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageOutput {
    pub matches: Vec<Match>,
    pub advancements: Vec<BracketAdvancement>,
    pub optimization: Option<OptimizationReport>,
    pub breakdown: Option<ScoreBreakdown>,
}

impl StageStrategy {
    pub fn for_stage_type(stage_type: StageType) -> Self {
        match stage_type {
            StageType::RoundRobin => StageStrategy::RoundRobinFrc,
            StageType::Swiss => StageStrategy::Swiss,
            StageType::Playoff => StageStrategy::Playoff,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageStrategy::RoundRobinFrc => "round_robin_frc",
            StageStrategy::Swiss => "swiss",
            StageStrategy::Playoff => "playoff",
        }
    }

    pub fn generate(
        self,
        plan: &StagePlan<'_>,
        config: &EngineConfig,
        rng: &mut dyn RandomSource,
    ) -> ScheduleResult<StageOutput> {
        let output = match self {
            StageStrategy::RoundRobinFrc => round_robin(plan, config, rng)?,
            StageStrategy::Swiss => swiss(plan, rng)?,
            StageStrategy::Playoff => playoff(plan, rng)?,
        };
        info!(
            stage = %plan.stage.id,
            strategy = self.name(),
            matches = output.matches.len(),
            "stage strategy finished"
        );
        Ok(output)
    }
}

fn already_generated(plan: &StagePlan<'_>) -> ScheduleResult<()> {
    if plan.prior.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::StageNotReady(format!(
            "stage {} already has {} matches",
            plan.stage.id,
            plan.prior.len()
        )))
    }
}

fn round_robin(
    plan: &StagePlan<'_>,
    config: &EngineConfig,
    rng: &mut dyn RandomSource,
) -> ScheduleResult<StageOutput> {
    already_generated(plan)?;
    let mut balancer = FieldBalancer::new(plan.fields)?;

    // The generator works on positions 1..=N; map them back to team indices.
    let mut indices: Vec<TeamIndex> = plan.teams.iter().map(|t| t.index).collect();
    indices.sort_unstable();

    let generator = RoundRobinGenerator::new(plan.stage.teams_per_alliance);
    let schedule = generator.generate(indices.len() as u32, plan.stage.rounds, rng)?;

    let optimizer = ScheduleOptimizer::new(
        config.optimizer.clone(),
        Scorer::new(config.weights.clone(), config.schedule.min_match_separation),
    );
    let (best, report) = optimizer.optimize(schedule, rng);
    let breakdown = optimizer.scorer().score_schedule(&best);

    let mut matches: Vec<Match> = best
        .matches
        .into_iter()
        .map(|m| remap(m, &indices))
        .collect();
    balancer.assign_all(&mut matches, rng);

    Ok(StageOutput {
        matches,
        advancements: Vec::new(),
        optimization: Some(report),
        breakdown: Some(breakdown),
    })
}

fn remap(mut m: Match, indices: &[TeamIndex]) -> Match {
    let lookup = |p: TeamIndex| indices[p as usize - 1];
    m.red = m.red.iter().map(|&p| lookup(p)).collect();
    m.blue = m.blue.iter().map(|&p| lookup(p)).collect();
    m.surrogates = m.surrogates.iter().map(|&p| lookup(p)).collect();
    m
}

fn swiss(plan: &StagePlan<'_>, rng: &mut dyn RandomSource) -> ScheduleResult<StageOutput> {
    let engine = SwissPairingEngine::new(plan.stage.teams_per_alliance)?;
    let required = 2 * SWISS_TEAMS_PER_ALLIANCE as usize;
    if plan.teams.len() < required {
        return Err(ScheduleError::InsufficientTeams {
            available: plan.teams.len(),
            required,
        });
    }
    let mut balancer = FieldBalancer::with_history(plan.fields, plan.prior)?;

    let teams: Vec<TeamIndex> = plan.teams.iter().map(|t| t.index).collect();
    // Teams dropped from the roster still count as past opponents but are
    // not paired again.
    let standings: Vec<_> = RankingCalculator::compute(&teams, plan.prior)
        .into_iter()
        .filter(|r| teams.contains(&r.team))
        .collect();
    let history = MatchupHistory::from_matches(plan.prior);
    let matches = engine.pair_round(&standings, &history, plan.prior, &mut balancer, rng);

    Ok(StageOutput {
        matches,
        ..StageOutput::default()
    })
}

fn playoff(plan: &StagePlan<'_>, rng: &mut dyn RandomSource) -> ScheduleResult<StageOutput> {
    already_generated(plan)?;
    let tpa = plan.stage.teams_per_alliance;
    if tpa == 0 {
        return Err(ScheduleError::StageNotReady(format!(
            "playoff stage {} has no teams per alliance",
            plan.stage.id
        )));
    }
    let mut balancer = FieldBalancer::new(plan.fields)?;

    // Repository order is seed order; consecutive teams form one alliance.
    let seeds: Vec<Seed> = plan
        .teams
        .chunks_exact(tpa as usize)
        .map(|alliance| alliance.iter().map(|t| t.index).collect())
        .collect();
    let bracket = BracketBuilder::new(tpa).build(&seeds, plan.stage.rounds)?;

    let advancements = bracket.advancement_list();
    let mut matches: Vec<Match> = bracket.matches.into_values().collect();
    balancer.assign_all(&mut matches, rng);

    Ok(StageOutput {
        matches,
        advancements,
        ..StageOutput::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;
    use std::collections::BTreeSet;

    fn teams(indices: impl IntoIterator<Item = TeamIndex>) -> Vec<Team> {
        indices
            .into_iter()
            .map(|i| Team {
                id: format!("team-{i}"),
                index: i,
                name: format!("Team {i}"),
            })
            .collect()
    }

    fn fields() -> Vec<Field> {
        vec![
            Field {
                id: "a".to_string(),
                name: "A".to_string(),
            },
            Field {
                id: "b".to_string(),
                name: "B".to_string(),
            },
        ]
    }

    fn stage(stage_type: StageType, rounds: u32) -> Stage {
        Stage {
            id: "quals".to_string(),
            tournament_id: Some("cup".to_string()),
            stage_type,
            rounds,
            teams_per_alliance: 2,
        }
    }

    fn quick_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.optimizer.max_iterations = Some(2_000);
        config
    }

    #[test]
    fn strategy_follows_stage_type() {
        assert_eq!(
            StageStrategy::for_stage_type(StageType::RoundRobin),
            StageStrategy::RoundRobinFrc
        );
        assert_eq!(StageStrategy::for_stage_type(StageType::Swiss), StageStrategy::Swiss);
        assert_eq!(
            StageStrategy::for_stage_type(StageType::Playoff),
            StageStrategy::Playoff
        );
    }

    #[test]
    fn round_robin_maps_positions_to_team_indices() {
        let stage = stage(StageType::RoundRobin, 2);
        let teams = teams([10, 20, 30, 40, 50, 60, 70, 80]);
        let fields = fields();
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &[],
        };
        let output = StageStrategy::RoundRobinFrc
            .generate(&plan, &quick_config(), &mut seeded(3))
            .unwrap();

        assert_eq!(output.matches.len(), 4);
        let used: BTreeSet<TeamIndex> = output.matches.iter().flat_map(|m| m.teams()).collect();
        assert_eq!(used, (1..=8).map(|i| i * 10).collect());
        assert!(output.matches.iter().all(|m| m.field.is_some()));
        let report = output.optimization.unwrap();
        assert!(report.best_score <= report.initial_score);
        assert_eq!(output.breakdown.unwrap().total, report.best_score);
    }

    #[test]
    fn round_robin_needs_fields() {
        let stage = stage(StageType::RoundRobin, 1);
        let teams = teams(1..=4);
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &[],
            prior: &[],
        };
        assert!(matches!(
            StageStrategy::RoundRobinFrc.generate(&plan, &quick_config(), &mut seeded(0)),
            Err(ScheduleError::EmptyFieldSet)
        ));
    }

    #[test]
    fn swiss_pairs_from_prior_results() {
        let stage = stage(StageType::Swiss, 0);
        let teams = teams(1..=8);
        let fields = fields();
        let mut first = Match::new(1, 1, vec![1, 2], vec![3, 4]);
        first.record_score(50, 10).unwrap();
        let mut second = Match::new(2, 1, vec![5, 6], vec![7, 8]);
        second.record_score(10, 50).unwrap();
        let prior = vec![first, second];

        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &prior,
        };
        let output = StageStrategy::Swiss
            .generate(&plan, &quick_config(), &mut seeded(0))
            .unwrap();

        assert_eq!(output.matches.len(), 2);
        // Winners 1, 2, 7, 8 group together; 1 and 2 never faced 7 or 8.
        let top = &output.matches[0];
        assert_eq!(top.number, 3);
        assert_eq!(top.round, 2);
        assert_eq!(top.red, vec![1, 2]);
        assert_eq!(top.blue, vec![7, 8]);
    }

    #[test]
    fn swiss_skips_teams_off_the_roster() {
        let stage = stage(StageType::Swiss, 0);
        let teams = teams(1..=8);
        let fields = fields();
        let mut first = Match::new(1, 1, vec![1, 2], vec![3, 4]);
        first.record_score(50, 10).unwrap();
        let mut second = Match::new(2, 1, vec![5, 6], vec![7, 9]);
        second.record_score(10, 50).unwrap();
        let prior = vec![first, second];

        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &prior,
        };
        let output = StageStrategy::Swiss
            .generate(&plan, &quick_config(), &mut seeded(0))
            .unwrap();

        assert_eq!(output.matches.len(), 2);
        let paired: BTreeSet<TeamIndex> = output.matches.iter().flat_map(|m| m.teams()).collect();
        assert_eq!(paired, (1..=8).collect::<BTreeSet<_>>());
    }

    #[test]
    fn swiss_rejects_other_alliance_sizes() {
        let mut stage = stage(StageType::Swiss, 0);
        stage.teams_per_alliance = 3;
        let teams = teams(1..=12);
        let fields = fields();
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &[],
        };
        assert!(matches!(
            StageStrategy::Swiss.generate(&plan, &quick_config(), &mut seeded(0)),
            Err(ScheduleError::UnsupportedTeamsPerAlliance { .. })
        ));
    }

    #[test]
    fn playoff_groups_seeds_into_alliances() {
        let stage = stage(StageType::Playoff, 1);
        let teams = teams([4, 9, 2, 7]);
        let fields = fields();
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &[],
        };
        let output = StageStrategy::Playoff
            .generate(&plan, &quick_config(), &mut seeded(0))
            .unwrap();

        assert_eq!(output.matches.len(), 1);
        assert_eq!(output.matches[0].red, vec![4, 9]);
        assert_eq!(output.matches[0].blue, vec![2, 7]);
        assert!(output.advancements.is_empty());
    }

    #[test]
    fn playoff_needs_teams_in_each_alliance() {
        let mut stage = stage(StageType::Playoff, 1);
        stage.teams_per_alliance = 0;
        let teams = teams(1..=4);
        let fields = fields();
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &[],
        };
        let err = StageStrategy::Playoff
            .generate(&plan, &quick_config(), &mut seeded(0))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::StageNotReady(_)));
        assert!(err.to_string().contains("no teams per alliance"));
    }

    #[test]
    fn playoff_is_built_once() {
        let stage = stage(StageType::Playoff, 1);
        let teams = teams(1..=4);
        let fields = fields();
        let prior = vec![Match::new(1, 1, vec![1, 2], vec![3, 4])];
        let plan = StagePlan {
            stage: &stage,
            teams: &teams,
            fields: &fields,
            prior: &prior,
        };
        assert!(matches!(
            StageStrategy::Playoff.generate(&plan, &quick_config(), &mut seeded(0)),
            Err(ScheduleError::StageNotReady(_))
        ));
    }
}
