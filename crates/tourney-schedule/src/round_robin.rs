//! Initial qualification schedule.
//!
//! When the team count is a multiple of the match size, teams are dealt
//! out by rotating a fixed offset through the team indices. Otherwise
//! every match takes the teams with the fewest appearances so far; a
//! team pulled in after it already owes no more appearances plays as a
//! surrogate.

use tracing::{debug, info};
use tourney_core::{Match, TeamIndex};

use crate::error::{ScheduleError, ScheduleResult};
use crate::random::{RandomSource, shuffle};
use crate::stats::Schedule;

/// Seeds a balanced schedule for the optimizer to refine.
#[derive(Debug, Clone)]
pub struct RoundRobinGenerator {
    teams_per_alliance: u32,
}

impl RoundRobinGenerator {
    pub fn new(teams_per_alliance: u32) -> Self {
        Self { teams_per_alliance }
    }

    pub fn match_size(&self) -> u32 {
        2 * self.teams_per_alliance
    }

    /// Number of matches needed for `rounds` appearances per team.
    pub fn match_count(&self, team_count: u32, rounds: u32) -> u32 {
        (team_count * rounds).div_ceil(self.match_size())
    }

    pub fn generate(
        &self,
        team_count: u32,
        rounds: u32,
        rng: &mut dyn RandomSource,
    ) -> ScheduleResult<Schedule> {
        if self.teams_per_alliance == 0 {
            return Err(ScheduleError::UnsupportedTeamsPerAlliance {
                expected: 2,
                actual: 0,
            });
        }
        let size = self.match_size();
        if team_count < size {
            return Err(ScheduleError::InsufficientTeams {
                available: team_count as usize,
                required: size as usize,
            });
        }

        let count = self.match_count(team_count, rounds);
        let matches = if team_count % size == 0 {
            self.rotate(team_count, count)
        } else {
            self.fewest_first(team_count, rounds, count, rng)
        };

        info!(
            teams = team_count,
            rounds,
            matches = matches.len(),
            even = team_count % size == 0,
            "round-robin schedule generated"
        );
        Ok(Schedule::new(team_count, self.teams_per_alliance, matches))
    }

    fn rotate(&self, team_count: u32, count: u32) -> Vec<Match> {
        let size = self.match_size();
        (1..=count)
            .map(|k| {
                let teams: Vec<TeamIndex> = (0..size)
                    .map(|i| ((k - 1) * size + i) % team_count + 1)
                    .collect();
                self.split(k, team_count, teams)
            })
            .collect()
    }

    fn fewest_first(
        &self,
        team_count: u32,
        rounds: u32,
        count: u32,
        rng: &mut dyn RandomSource,
    ) -> Vec<Match> {
        let size = self.match_size() as usize;
        let mut appearances = vec![0u32; team_count as usize];
        let mut matches = Vec::with_capacity(count as usize);

        for k in 1..=count {
            let mut order: Vec<usize> = (0..team_count as usize).collect();
            // Stable: equal counts keep index order.
            order.sort_by_key(|&i| appearances[i]);
            let mut picked: Vec<TeamIndex> = order
                .into_iter()
                .take(size)
                .map(|i| i as TeamIndex + 1)
                .collect();

            let surrogates: Vec<TeamIndex> = picked
                .iter()
                .copied()
                .filter(|&t| appearances[t as usize - 1] >= rounds)
                .collect();
            for &t in &picked {
                appearances[t as usize - 1] += 1;
            }

            shuffle(rng, &mut picked);
            let mut m = self.split(k, team_count, picked);
            if !surrogates.is_empty() {
                debug!(number = k, ?surrogates, "filling match with surrogates");
                m.surrogates.extend(surrogates);
            }
            matches.push(m);
        }
        matches
    }

    fn split(&self, number: u32, team_count: u32, mut teams: Vec<TeamIndex>) -> Match {
        let blue = teams.split_off(self.teams_per_alliance as usize);
        let round = (number - 1) * self.match_size() / team_count + 1;
        Match::new(number, round, teams, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;
    use std::collections::HashSet;

    fn distinct(m: &Match) -> bool {
        let teams: HashSet<_> = m.teams().collect();
        teams.len() == m.red.len() + m.blue.len()
    }

    #[test]
    fn even_teams_rotate_through_indices() {
        let schedule = RoundRobinGenerator::new(2)
            .generate(8, 1, &mut seeded(0))
            .unwrap();

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.matches[0].red, vec![1, 2]);
        assert_eq!(schedule.matches[0].blue, vec![3, 4]);
        assert_eq!(schedule.matches[1].red, vec![5, 6]);
        assert_eq!(schedule.matches[1].blue, vec![7, 8]);
    }

    #[test]
    fn match_count_covers_all_appearances() {
        let generator = RoundRobinGenerator::new(2);
        for (teams, rounds) in [(8, 1), (8, 6), (12, 5), (16, 10)] {
            let schedule = generator.generate(teams, rounds, &mut seeded(1)).unwrap();
            assert_eq!(schedule.len() as u32, (teams * rounds).div_ceil(4));
            assert!(schedule.matches.iter().all(distinct));
            assert!(schedule.appearances().iter().all(|&a| a == rounds));
        }
    }

    #[test]
    fn uneven_teams_balance_appearances() {
        let schedule = RoundRobinGenerator::new(2)
            .generate(6, 2, &mut seeded(3))
            .unwrap();

        assert_eq!(schedule.len(), 3);
        assert!(schedule.matches.iter().all(distinct));
        assert_eq!(schedule.appearances(), vec![2; 6]);
        assert!(schedule.matches.iter().all(|m| m.surrogates.is_empty()));
    }

    #[test]
    fn uneven_overflow_marks_surrogates() {
        let schedule = RoundRobinGenerator::new(2)
            .generate(5, 1, &mut seeded(4))
            .unwrap();

        assert_eq!(schedule.len(), 2);
        let last = &schedule.matches[1];
        assert!(last.contains(5));
        assert!(!last.is_surrogate(5));
        let expected: Vec<TeamIndex> = vec![1, 2, 3];
        assert_eq!(last.surrogates.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn rounds_are_numbered_by_coverage() {
        let schedule = RoundRobinGenerator::new(2)
            .generate(8, 2, &mut seeded(0))
            .unwrap();
        let rounds: Vec<u32> = schedule.matches.iter().map(|m| m.round).collect();
        assert_eq!(rounds, vec![1, 1, 2, 2]);
    }

    #[test]
    fn too_few_teams_fails() {
        let err = RoundRobinGenerator::new(2)
            .generate(3, 1, &mut seeded(0))
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InsufficientTeams {
                available: 3,
                required: 4
            }
        ));
    }
}
