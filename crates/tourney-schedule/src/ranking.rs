//! Team rankings, recomputed from scratch by replaying completed matches.
//!
//! Rankings are never patched incrementally: every ranking-affecting
//! event replays the full set of completed matches, so running the
//! calculator twice on the same input yields identical output.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::info;
use tourney_core::{AllianceColor, Match, TeamIndex, TeamRanking};

/// Replays completed matches into per-team rankings.
pub struct RankingCalculator;

impl RankingCalculator {
    /// Compute rankings for `teams` (plus any team found in the matches)
    /// from every completed match. Surrogate appearances are ignored.
    /// Output is ordered by team index.
    pub fn compute(teams: &[TeamIndex], matches: &[Match]) -> Vec<TeamRanking> {
        let mut rankings: BTreeMap<TeamIndex, TeamRanking> = teams
            .iter()
            .map(|&t| (t, TeamRanking::new(t)))
            .collect();
        let mut opponents: BTreeMap<TeamIndex, BTreeSet<TeamIndex>> = BTreeMap::new();
        let mut best_scores: BTreeMap<TeamIndex, u32> = BTreeMap::new();
        let mut completed = 0usize;

        for m in matches.iter().filter(|m| m.is_completed()) {
            completed += 1;
            for color in [AllianceColor::Red, AllianceColor::Blue] {
                let own = m.score(color).unwrap_or(0);
                let against = m.score(color.opposite()).unwrap_or(0);
                let rivals: Vec<TeamIndex> = m
                    .alliance(color.opposite())
                    .iter()
                    .copied()
                    .filter(|&t| !m.is_surrogate(t))
                    .collect();

                for &team in m.alliance(color).iter().filter(|&&t| !m.is_surrogate(t)) {
                    let r = rankings
                        .entry(team)
                        .or_insert_with(|| TeamRanking::new(team));
                    r.matches_played += 1;
                    r.points_scored += u64::from(own);
                    r.points_conceded += u64::from(against);
                    match m.winner {
                        Some(winner) if winner == color => r.wins += 1,
                        Some(_) => r.losses += 1,
                        None => r.ties += 1,
                    }

                    let best = best_scores.entry(team).or_insert(0);
                    *best = (*best).max(own);
                    opponents.entry(team).or_default().extend(rivals.iter().copied());
                }
            }
        }

        let win_rates: BTreeMap<TeamIndex, f64> =
            rankings.iter().map(|(&t, r)| (t, r.win_rate())).collect();

        for (team, r) in rankings.iter_mut() {
            r.opponent_win_percentage = match opponents.get(team) {
                Some(faced) if !faced.is_empty() => {
                    let total: f64 = faced
                        .iter()
                        .map(|o| win_rates.get(o).copied().unwrap_or(0.0))
                        .sum();
                    total / faced.len() as f64
                }
                _ => 0.0,
            };
            r.tiebreaker_1 = if r.matches_played == 0 {
                0.0
            } else {
                r.points_scored as f64 / f64::from(r.matches_played)
            };
            r.tiebreaker_2 = f64::from(best_scores.get(team).copied().unwrap_or(0));
            r.rank = None;
        }

        info!(
            teams = rankings.len(),
            completed_matches = completed,
            "rankings recomputed"
        );
        rankings.into_values().collect()
    }

    /// Sort rankings best-first and assign 1-based rank positions.
    pub fn standings(mut rankings: Vec<TeamRanking>) -> Vec<TeamRanking> {
        rankings.sort_by(compare_standing);
        for (i, r) in rankings.iter_mut().enumerate() {
            r.rank = Some(i as u32 + 1);
        }
        rankings
    }
}

/// Best first: ranking points, OWP, point differential, both
/// tiebreakers, then lowest team index.
fn compare_standing(a: &TeamRanking, b: &TeamRanking) -> Ordering {
    b.ranking_points()
        .cmp(&a.ranking_points())
        .then_with(|| b.opponent_win_percentage.total_cmp(&a.opponent_win_percentage))
        .then_with(|| b.point_differential().cmp(&a.point_differential()))
        .then_with(|| b.tiebreaker_1.total_cmp(&a.tiebreaker_1))
        .then_with(|| b.tiebreaker_2.total_cmp(&a.tiebreaker_2))
        .then_with(|| a.team.cmp(&b.team))
}
