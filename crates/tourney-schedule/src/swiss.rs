//! Swiss-style pairing, one round at a time.
//!
//! Teams are ordered by current standing and consumed four at a time,
//! so each match groups teams of similar performance. Each group is
//! split into alliances to avoid repeat opponents. Teams left over when
//! fewer than four remain sit the round out.

use std::cmp::Ordering;

use tracing::{info, warn};
use tourney_core::{Match, TeamIndex, TeamRanking};

use crate::error::{ScheduleError, ScheduleResult};
use crate::field_balancer::FieldBalancer;
use crate::history::MatchupHistory;
use crate::random::RandomSource;

/// Alliance size the pairing engine is built for.
pub const SWISS_TEAMS_PER_ALLIANCE: u32 = 2;

const GROUP_SIZE: usize = 2 * SWISS_TEAMS_PER_ALLIANCE as usize;

#[derive(Debug, Clone)]
pub struct SwissPairingEngine {
    teams_per_alliance: u32,
}

impl SwissPairingEngine {
    /// Fails fast for any alliance size other than two.
    pub fn new(teams_per_alliance: u32) -> ScheduleResult<Self> {
        if teams_per_alliance != SWISS_TEAMS_PER_ALLIANCE {
            return Err(ScheduleError::UnsupportedTeamsPerAlliance {
                expected: SWISS_TEAMS_PER_ALLIANCE,
                actual: teams_per_alliance,
            });
        }
        Ok(Self { teams_per_alliance })
    }

    pub fn teams_per_alliance(&self) -> u32 {
        self.teams_per_alliance
    }

    /// Pair the next round. Round and match numbers continue from the
    /// highest found in `prior`.
    pub fn pair_round(
        &self,
        standings: &[TeamRanking],
        history: &MatchupHistory,
        prior: &[Match],
        balancer: &mut FieldBalancer,
        rng: &mut dyn RandomSource,
    ) -> Vec<Match> {
        let round = prior.iter().map(|m| m.round).max().unwrap_or(0) + 1;
        let mut number = prior.iter().map(|m| m.number).max().unwrap_or(0);

        let mut order: Vec<&TeamRanking> = standings.iter().collect();
        // Stable: equal standings keep their input order.
        order.sort_by(|a, b| compare_performance(a, b));
        let order: Vec<TeamIndex> = order.into_iter().map(|r| r.team).collect();

        let mut matches = Vec::with_capacity(order.len() / GROUP_SIZE);
        let mut groups = order.chunks_exact(GROUP_SIZE);
        for group in groups.by_ref() {
            let group = [group[0], group[1], group[2], group[3]];
            let (red, blue) = history.best_split(group);
            number += 1;
            let mut m = Match::new(number, round, red.to_vec(), blue.to_vec());
            m.field = Some(balancer.next_field(rng));
            matches.push(m);
        }

        let sitting_out = groups.remainder();
        if !sitting_out.is_empty() {
            warn!(round, teams = ?sitting_out, "teams sit out this round");
        }
        info!(round, matches = matches.len(), "swiss round paired");
        matches
    }
}

/// Descending by ranking points, then OWP, then point differential.
fn compare_performance(a: &TeamRanking, b: &TeamRanking) -> Ordering {
    b.ranking_points()
        .cmp(&a.ranking_points())
        .then_with(|| b.opponent_win_percentage.total_cmp(&a.opponent_win_percentage))
        .then_with(|| b.point_differential().cmp(&a.point_differential()))
}
