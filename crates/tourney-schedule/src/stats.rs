//! Schedules and the per-team statistics derived from them.
//!
//! [`ScheduleStats`] is always a function of the match list:
//! [`ScheduleStats::recompute`] replays every match in order, and the
//! incremental [`ScheduleStats::add_match`] / [`ScheduleStats::remove_match`]
//! path used by the optimizer must land on the same value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tourney_core::{AllianceColor, Match, TeamIndex};

/// An ordered list of matches for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub team_count: u32,
    pub teams_per_alliance: u32,
    pub matches: Vec<Match>,
    /// Final optimizer score, once one has been computed.
    pub score: Option<f64>,
}

impl Schedule {
    pub fn new(team_count: u32, teams_per_alliance: u32, matches: Vec<Match>) -> Self {
        Self {
            team_count,
            teams_per_alliance,
            matches,
            score: None,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of appearances per team, indexed by `team - 1`.
    pub fn appearances(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.team_count as usize];
        for m in &self.matches {
            for team in m.teams() {
                if let Some(c) = slot(team).and_then(|i| counts.get_mut(i)) {
                    *c += 1;
                }
            }
        }
        counts
    }
}

/// Statistics for a single team within a schedule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamStats {
    /// Positions in the schedule the team appears at, ascending.
    pub matches: Vec<usize>,
    /// Partner index → times on the same alliance.
    pub partners: BTreeMap<TeamIndex, u32>,
    /// Opponent index → times on the opposing alliance.
    pub opponents: BTreeMap<TeamIndex, u32>,
    pub red_count: u32,
    pub blue_count: u32,
    /// Appearances per station: RED stations first, then BLUE.
    pub stations: Vec<u32>,
}

impl TeamStats {
    fn new(station_count: usize) -> Self {
        Self {
            stations: vec![0; station_count],
            ..Default::default()
        }
    }

    pub fn appearances(&self) -> usize {
        self.matches.len()
    }
}

/// Per-team statistics for a whole schedule, indexed by `team - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStats {
    teams: Vec<TeamStats>,
    stations_per_alliance: usize,
}

impl ScheduleStats {
    /// Build stats by replaying every match in order.
    pub fn recompute(schedule: &Schedule) -> Self {
        let stations_per_alliance = schedule.teams_per_alliance as usize;
        let mut stats = Self {
            teams: (0..schedule.team_count)
                .map(|_| TeamStats::new(2 * stations_per_alliance))
                .collect(),
            stations_per_alliance,
        };
        for (pos, m) in schedule.matches.iter().enumerate() {
            stats.add_match(pos, m);
        }
        stats
    }

    pub fn team(&self, team: TeamIndex) -> Option<&TeamStats> {
        slot(team).and_then(|i| self.teams.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamIndex, &TeamStats)> {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, s)| (i as TeamIndex + 1, s))
    }

    pub fn stations_per_alliance(&self) -> usize {
        self.stations_per_alliance
    }

    /// Add the contribution of the match at `pos`.
    pub fn add_match(&mut self, pos: usize, m: &Match) {
        self.apply(pos, m, true);
    }

    /// Remove the contribution of the match at `pos`.
    pub fn remove_match(&mut self, pos: usize, m: &Match) {
        self.apply(pos, m, false);
    }

    fn apply(&mut self, pos: usize, m: &Match, add: bool) {
        for color in [AllianceColor::Red, AllianceColor::Blue] {
            let own = m.alliance(color);
            let other = m.alliance(color.opposite());
            let station_base = match color {
                AllianceColor::Red => 0,
                AllianceColor::Blue => self.stations_per_alliance,
            };

            for (station, &team) in own.iter().enumerate() {
                let Some(stats) = slot(team).and_then(|i| self.teams.get_mut(i)) else {
                    continue;
                };

                match stats.matches.binary_search(&pos) {
                    Ok(i) if !add => {
                        stats.matches.remove(i);
                    }
                    Err(i) if add => stats.matches.insert(i, pos),
                    _ => {}
                }

                let color_count = match color {
                    AllianceColor::Red => &mut stats.red_count,
                    AllianceColor::Blue => &mut stats.blue_count,
                };
                bump(color_count, add);

                if let Some(c) = stats.stations.get_mut(station_base + station) {
                    bump(c, add);
                }

                for &partner in own.iter().filter(|&&p| p != team) {
                    bump_entry(&mut stats.partners, partner, add);
                }
                for &opponent in other {
                    bump_entry(&mut stats.opponents, opponent, add);
                }
            }
        }
    }
}

fn slot(team: TeamIndex) -> Option<usize> {
    (team as usize).checked_sub(1)
}

fn bump(counter: &mut u32, add: bool) {
    if add {
        *counter += 1;
    } else {
        *counter = counter.saturating_sub(1);
    }
}

fn bump_entry(map: &mut BTreeMap<TeamIndex, u32>, key: TeamIndex, add: bool) {
    if add {
        *map.entry(key).or_insert(0) += 1;
    } else if let Some(count) = map.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            map.remove(&key);
        }
    }
}
