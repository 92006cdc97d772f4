//! Schedule scoring. Lower is better; a perfect schedule scores 0.
//!
//! The score sums, over every team:
//! - **Partner repeats**: each partner seen more than once
//! - **Opponent repeats**: each opponent faced more than once
//! - **Separation**: consecutive appearances closer than the minimum gap
//! - **Color imbalance**: |RED − BLUE| appearances
//! - **Station imbalance**: deviation from an even spread over stations

use serde::Serialize;
use tourney_core::config::WeightsConfig;

use crate::stats::{Schedule, ScheduleStats};

/// Individual penalty components, already weighted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub partner_repeat: f64,
    pub opponent_repeat: f64,
    pub separation: f64,
    pub color_imbalance: f64,
    pub station_imbalance: f64,
    pub total: f64,
}

/// Scores schedules under a fixed set of weights.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub weights: WeightsConfig,
    pub min_match_separation: u32,
}

impl Scorer {
    pub fn new(weights: WeightsConfig, min_match_separation: u32) -> Self {
        Self {
            weights,
            min_match_separation,
        }
    }

    pub fn score_schedule(&self, schedule: &Schedule) -> ScoreBreakdown {
        self.score(&ScheduleStats::recompute(schedule))
    }

    pub fn score(&self, stats: &ScheduleStats) -> ScoreBreakdown {
        let w = &self.weights;
        let station_count = 2 * stats.stations_per_alliance();
        let mut b = ScoreBreakdown::default();

        for (_, team) in stats.iter() {
            b.partner_repeat += team
                .partners
                .values()
                .filter(|&&c| c > 1)
                .map(|&c| w.partner_repeat * f64::from(c - 1))
                .sum::<f64>();

            b.opponent_repeat += team
                .opponents
                .values()
                .filter(|&&c| c > 1)
                .map(|&c| w.opponent_repeat * f64::from(c - 1))
                .sum::<f64>();

            let min_gap = self.min_match_separation as usize;
            b.separation += team
                .matches
                .windows(2)
                .map(|pair| min_gap.saturating_sub(pair[1] - pair[0]))
                .map(|short| w.separation * short as f64)
                .sum::<f64>();

            b.color_imbalance +=
                w.color_imbalance * f64::from(team.red_count.abs_diff(team.blue_count));

            if station_count > 0 {
                let expected = team.appearances() as f64 / station_count as f64;
                b.station_imbalance += team
                    .stations
                    .iter()
                    .map(|&c| w.station_imbalance * (f64::from(c) - expected).abs())
                    .sum::<f64>();
            }
        }

        b.total = b.partner_repeat
            + b.opponent_repeat
            + b.separation
            + b.color_imbalance
            + b.station_imbalance;
        b
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(WeightsConfig::default(), 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_core::Match;

    fn schedule(matches: Vec<Match>, teams: u32) -> Schedule {
        Schedule::new(teams, 2, matches)
    }

    #[test]
    fn repeated_partner_is_penalized_per_team() {
        let s = schedule(
            vec![
                Match::new(1, 1, vec![1, 2], vec![3, 4]),
                Match::new(2, 1, vec![1, 2], vec![5, 6]),
            ],
            6,
        );
        let scorer = Scorer::new(WeightsConfig::default(), 0);
        let b = scorer.score_schedule(&s);
        // Teams 1 and 2 each see the other twice: 2 × 3.0 × (2 − 1).
        assert_eq!(b.partner_repeat, 6.0);
        assert_eq!(b.opponent_repeat, 0.0);
    }

    #[test]
    fn repeated_opponent_is_penalized() {
        let s = schedule(
            vec![
                Match::new(1, 1, vec![1, 2], vec![3, 4]),
                Match::new(2, 1, vec![1, 5], vec![3, 6]),
            ],
            6,
        );
        let b = Scorer::new(WeightsConfig::default(), 0).score_schedule(&s);
        // 1 faces 3 twice and 3 faces 1 twice.
        assert_eq!(b.opponent_repeat, 4.0);
    }

    #[test]
    fn back_to_back_matches_violate_separation() {
        let s = schedule(
            vec![
                Match::new(1, 1, vec![1, 2], vec![3, 4]),
                Match::new(2, 1, vec![5, 6], vec![1, 7]),
            ],
            8,
        );
        let b = Scorer::new(WeightsConfig::default(), 3).score_schedule(&s);
        // Team 1 has a gap of 1 against a minimum of 3.
        assert_eq!(b.separation, 20.0);
    }

    #[test]
    fn color_imbalance_counts_difference() {
        let s = schedule(
            vec![
                Match::new(1, 1, vec![1, 2], vec![3, 4]),
                Match::new(2, 1, vec![1, 3], vec![2, 4]),
            ],
            4,
        );
        let b = Scorer::new(WeightsConfig::default(), 0).score_schedule(&s);
        // Team 1: RED twice; team 4: BLUE twice; teams 2 and 3 balanced.
        assert_eq!(b.color_imbalance, 8.0);
    }

    #[test]
    fn station_imbalance_uses_expected_spread() {
        let s = schedule(vec![Match::new(1, 1, vec![1, 2], vec![3, 4])], 4);
        let b = Scorer::new(WeightsConfig::default(), 0).score_schedule(&s);
        // Each team: one station at 1 (0.75 off), three at 0 (0.25 off) → 1.5 × 0.5.
        assert!((b.station_imbalance - 4.0 * 0.75).abs() < 1e-9);
    }

    #[test]
    fn total_is_sum_of_components() {
        let s = schedule(
            vec![
                Match::new(1, 1, vec![1, 2], vec![3, 4]),
                Match::new(2, 1, vec![1, 2], vec![3, 4]),
            ],
            4,
        );
        let b = Scorer::default().score_schedule(&s);
        let sum = b.partner_repeat
            + b.opponent_repeat
            + b.separation
            + b.color_imbalance
            + b.station_imbalance;
        assert!((b.total - sum).abs() < 1e-9);
        assert!(b.total > 0.0);
    }
}
