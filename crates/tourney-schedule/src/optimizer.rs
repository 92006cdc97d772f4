//! Simulated-annealing refinement of a schedule.
//!
//! Each step swaps two teams between two random matches and keeps the
//! result under the Metropolis criterion. The walk may accept worse
//! schedules, so the best schedule seen is tracked separately and is
//! what the caller gets back. Nothing the caller can see is touched
//! until the run finishes.

use serde::Serialize;
use tracing::{debug, info, warn};
use tourney_core::AllianceColor;
use tourney_core::config::OptimizerConfig;

use crate::random::RandomSource;
use crate::score::Scorer;
use crate::stats::{Schedule, ScheduleStats};

/// Below this temperature worse neighbors are always rejected.
const FROZEN_TEMPERATURE: f64 = 0.0001;

/// Outcome of an optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub initial_score: f64,
    pub best_score: f64,
    pub iterations: u32,
    pub accepted: u32,
    /// Neighbors discarded because a team would appear twice in a match.
    pub invalid_swaps: u32,
    pub final_temperature: f64,
}

/// One team-for-team exchange between two matches.
#[derive(Debug, Clone, Copy)]
struct Swap {
    a: usize,
    color_a: AllianceColor,
    station_a: usize,
    b: usize,
    color_b: AllianceColor,
    station_b: usize,
}

pub struct ScheduleOptimizer {
    config: OptimizerConfig,
    scorer: Scorer,
}

impl ScheduleOptimizer {
    pub fn new(config: OptimizerConfig, scorer: Scorer) -> Self {
        Self { config, scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Run the annealing loop and return the best schedule found,
    /// annotated with its score.
    pub fn optimize(
        &self,
        schedule: Schedule,
        rng: &mut dyn RandomSource,
    ) -> (Schedule, OptimizationReport) {
        let mut current = schedule;
        let mut stats = ScheduleStats::recompute(&current);
        let mut current_score = self.scorer.score(&stats).total;
        let initial_score = current_score;

        let mut report = OptimizationReport {
            initial_score,
            best_score: initial_score,
            iterations: 0,
            accepted: 0,
            invalid_swaps: 0,
            final_temperature: self.config.initial_temperature,
        };

        if current.len() < 2 {
            warn!(matches = current.len(), "fewer than two matches, nothing to optimize");
            current.score = Some(initial_score);
            return (current, report);
        }

        let max_iterations = self.config.iteration_cap();
        let step = self.config.iterations_per_cooling_step.max(1);
        let mut best = current.clone();
        let mut best_score = current_score;
        let mut temperature = self.config.initial_temperature;

        while report.iterations < max_iterations && temperature >= self.config.min_temperature {
            report.iterations += 1;

            match pick_swap(&current, rng) {
                Some(swap) => {
                    apply_swap(&mut current, &mut stats, swap);
                    let new_score = self.scorer.score(&stats).total;

                    if accept(new_score - current_score, temperature, rng) {
                        current_score = new_score;
                        report.accepted += 1;
                        if current_score < best_score {
                            best_score = current_score;
                            best = current.clone();
                        }
                    } else {
                        apply_swap(&mut current, &mut stats, swap);
                    }
                }
                None => report.invalid_swaps += 1,
            }

            if report.iterations % step == 0 {
                temperature *= self.config.cooling_rate;
                debug!(
                    iteration = report.iterations,
                    temperature,
                    current = current_score,
                    best = best_score,
                    "cooling step"
                );
            }
        }

        report.best_score = best_score;
        report.final_temperature = temperature;
        best.score = Some(best_score);

        info!(
            initial = initial_score,
            best = best_score,
            iterations = report.iterations,
            accepted = report.accepted,
            "schedule optimized"
        );
        (best, report)
    }
}

/// Metropolis acceptance.
fn accept(delta: f64, temperature: f64, rng: &mut dyn RandomSource) -> bool {
    if delta < 0.0 {
        return true;
    }
    if temperature < FROZEN_TEMPERATURE {
        return delta <= 0.0;
    }
    rng.next_unit() < (-delta / temperature).exp()
}

fn pick_color(rng: &mut dyn RandomSource) -> AllianceColor {
    if rng.next_index(2) == 0 {
        AllianceColor::Red
    } else {
        AllianceColor::Blue
    }
}

/// Pick two distinct matches, a slot in each, and check the exchange
/// keeps every match free of duplicate teams.
fn pick_swap(schedule: &Schedule, rng: &mut dyn RandomSource) -> Option<Swap> {
    let len = schedule.len();
    let a = rng.next_index(len);
    let mut b = rng.next_index(len - 1);
    if b >= a {
        b += 1;
    }

    let color_a = pick_color(rng);
    let color_b = pick_color(rng);
    let alliance_a = schedule.matches[a].alliance(color_a);
    let alliance_b = schedule.matches[b].alliance(color_b);
    if alliance_a.is_empty() || alliance_b.is_empty() {
        return None;
    }
    let station_a = rng.next_index(alliance_a.len());
    let station_b = rng.next_index(alliance_b.len());

    let team_a = alliance_a[station_a];
    let team_b = alliance_b[station_b];
    if team_a == team_b
        || schedule.matches[a].contains(team_b)
        || schedule.matches[b].contains(team_a)
    {
        return None;
    }

    Some(Swap {
        a,
        color_a,
        station_a,
        b,
        color_b,
        station_b,
    })
}

/// Exchange the two slots and keep the stats in step. Applying the
/// same swap twice restores the original schedule.
fn apply_swap(schedule: &mut Schedule, stats: &mut ScheduleStats, swap: Swap) {
    stats.remove_match(swap.a, &schedule.matches[swap.a]);
    stats.remove_match(swap.b, &schedule.matches[swap.b]);

    let team_a = schedule.matches[swap.a].alliance(swap.color_a)[swap.station_a];
    let team_b = schedule.matches[swap.b].alliance(swap.color_b)[swap.station_b];
    schedule.matches[swap.a].alliance_mut(swap.color_a)[swap.station_a] = team_b;
    schedule.matches[swap.b].alliance_mut(swap.color_b)[swap.station_b] = team_a;

    // Surrogate status belongs to the slot, not the team.
    let m = &mut schedule.matches[swap.a];
    if m.surrogates.remove(&team_a) {
        m.surrogates.insert(team_b);
    }
    let m = &mut schedule.matches[swap.b];
    if m.surrogates.remove(&team_b) {
        m.surrogates.insert(team_a);
    }

    stats.add_match(swap.a, &schedule.matches[swap.a]);
    stats.add_match(swap.b, &schedule.matches[swap.b]);
}
