//! Stage scheduler: drives a strategy against the collaborator traits.
//!
//! The `StageScheduler` is the entry point an owning service calls:
//! - Validates the stage is attached to a tournament
//! - Reads teams, fields and prior matches from the `TeamRepository`
//! - Runs the strategy selected by the stage type
//! - Pushes matches (and bracket links) through the `MatchSink`, stamping
//!   the numbers the sink returns
//! - Replays completed matches into rankings for the `RankingSink`

use std::collections::{BTreeMap, BTreeSet};

use anyhow::anyhow;
use tracing::{debug, info};
use tourney_core::{
    EngineConfig, MatchSink, RankingScope, RankingSink, Stage, TeamIndex, TeamRanking,
    TeamRepository,
};

use crate::error::{ScheduleError, ScheduleResult};
use crate::random::RandomSource;
use crate::ranking::RankingCalculator;
use crate::strategy::{StageOutput, StagePlan, StageStrategy};

pub struct StageScheduler {
    config: EngineConfig,
}

impl StageScheduler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate the next batch of matches for `stage` and persist them.
    ///
    /// Round-robin and playoff stages are generated once; Swiss stages
    /// produce one round per call.
    pub fn generate<R, S>(
        &self,
        stage: &Stage,
        repository: &R,
        sink: &mut S,
        rng: &mut dyn RandomSource,
    ) -> ScheduleResult<StageOutput>
    where
        R: TeamRepository + ?Sized,
        S: MatchSink + ?Sized,
    {
        if stage.tournament_id.is_none() {
            return Err(ScheduleError::StageNotReady(format!(
                "stage {} is not attached to a tournament",
                stage.id
            )));
        }

        let teams = repository.list_teams(stage)?;
        let fields = repository.list_fields(stage)?;
        let prior = repository.list_matches(stage)?;
        debug!(
            stage = %stage.id,
            teams = teams.len(),
            fields = fields.len(),
            prior = prior.len(),
            "stage inputs loaded"
        );

        let strategy = StageStrategy::for_stage_type(stage.stage_type);
        let plan = StagePlan {
            stage,
            teams: &teams,
            fields: &fields,
            prior: &prior,
        };
        let mut output = strategy.generate(&plan, &self.config, rng)?;

        let numbers = sink.save_matches(stage, &output.matches)?;
        if numbers.len() != output.matches.len() {
            return Err(ScheduleError::Repository(anyhow!(
                "match sink returned {} numbers for {} matches",
                numbers.len(),
                output.matches.len()
            )));
        }

        let renumbered: BTreeMap<u32, u32> = output
            .matches
            .iter()
            .zip(&numbers)
            .map(|(m, &n)| (m.number, n))
            .collect();
        for (m, &n) in output.matches.iter_mut().zip(&numbers) {
            m.number = n;
        }

        if !output.advancements.is_empty() {
            for link in &mut output.advancements {
                link.source = renumbered.get(&link.source).copied().unwrap_or(link.source);
                link.target = renumbered.get(&link.target).copied().unwrap_or(link.target);
            }
            sink.save_advancements(stage, &output.advancements)?;
        }

        info!(
            stage = %stage.id,
            strategy = strategy.name(),
            matches = output.matches.len(),
            advancements = output.advancements.len(),
            "stage schedule persisted"
        );
        Ok(output)
    }

    /// Replay every completed match of `stages` into standings for
    /// `scope` and upsert them.
    pub fn recompute_rankings<R, K>(
        &self,
        scope: &RankingScope,
        stages: &[Stage],
        repository: &R,
        sink: &mut K,
    ) -> ScheduleResult<Vec<TeamRanking>>
    where
        R: TeamRepository + ?Sized,
        K: RankingSink + ?Sized,
    {
        let mut teams: BTreeSet<TeamIndex> = BTreeSet::new();
        let mut matches = Vec::new();
        for stage in stages {
            teams.extend(repository.list_teams(stage)?.into_iter().map(|t| t.index));
            matches.extend(repository.list_matches(stage)?);
        }

        let teams: Vec<TeamIndex> = teams.into_iter().collect();
        let standings = RankingCalculator::standings(RankingCalculator::compute(&teams, &matches));
        sink.upsert_rankings(scope, &standings)?;

        info!(scope = %scope.key(), teams = standings.len(), "rankings upserted");
        Ok(standings)
    }
}
