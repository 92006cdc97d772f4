//! Single-elimination bracket construction.
//!
//! Round 1 pairs seed `i` against seed `2^R − 1 − i`. Later rounds are
//! created up front as empty placeholders, and every non-final match
//! gets an advancement record routing its winner onward: the `j`-th
//! match of a round feeds match `j / 2` of the next round, on RED when
//! `j` is even and BLUE when odd.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;
use tourney_core::{AllianceColor, BracketAdvancement, Match, TeamIndex};

use crate::error::{ScheduleError, ScheduleResult};

/// An alliance entering the bracket, captain first.
pub type Seed = Vec<TeamIndex>;

/// A bracket: matches by number, plus advancement records keyed by
/// source match number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: u32,
    pub teams_per_alliance: u32,
    pub matches: BTreeMap<u32, Match>,
    pub advancements: HashMap<u32, BracketAdvancement>,
}

impl Bracket {
    /// Rebuild a bracket from persisted matches and advancements.
    pub fn from_parts(
        rounds: u32,
        teams_per_alliance: u32,
        matches: Vec<Match>,
        advancements: Vec<BracketAdvancement>,
    ) -> Self {
        Self {
            rounds,
            teams_per_alliance,
            matches: matches.into_iter().map(|m| (m.number, m)).collect(),
            advancements: advancements.into_iter().map(|a| (a.source, a)).collect(),
        }
    }

    pub fn get(&self, number: u32) -> Option<&Match> {
        self.matches.get(&number)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut Match> {
        self.matches.get_mut(&number)
    }

    /// Matches of one round, in match-number order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.values().filter(move |m| m.round == round)
    }

    pub fn final_match(&self) -> Option<&Match> {
        self.round(self.rounds).next()
    }

    /// Advancement records sorted by source match.
    pub fn advancement_list(&self) -> Vec<BracketAdvancement> {
        let mut list: Vec<_> = self.advancements.values().copied().collect();
        list.sort_by_key(|a| a.source);
        list
    }

    /// Complete a bracket match. A winner is required.
    pub fn record_result(
        &mut self,
        number: u32,
        red: u32,
        blue: u32,
        winner: Option<AllianceColor>,
    ) -> ScheduleResult<()> {
        let m = self
            .matches
            .get_mut(&number)
            .ok_or(ScheduleError::MatchNotFound(number))?;
        m.complete(red, blue, winner)?;
        Ok(())
    }
}

pub struct BracketBuilder {
    teams_per_alliance: u32,
}

impl BracketBuilder {
    pub fn new(teams_per_alliance: u32) -> Self {
        Self { teams_per_alliance }
    }

    /// Build a bracket of `rounds` elimination rounds from seeds in
    /// performance order. Only the top `2^rounds` seeds are used.
    pub fn build(&self, seeds: &[Seed], rounds: u32) -> ScheduleResult<Bracket> {
        if rounds == 0 || rounds > 16 {
            return Err(ScheduleError::StageNotReady(format!(
                "playoff needs between 1 and 16 rounds, got {rounds}"
            )));
        }
        let size = 1usize << rounds;
        if seeds.len() < size {
            return Err(ScheduleError::InsufficientSeeds {
                available: seeds.len(),
                required: size,
            });
        }
        for (i, seed) in seeds.iter().take(size).enumerate() {
            if seed.len() != self.teams_per_alliance as usize {
                return Err(ScheduleError::MalformedSeed {
                    seed: i + 1,
                    expected: self.teams_per_alliance,
                    actual: seed.len(),
                });
            }
        }

        let mut matches = BTreeMap::new();
        let mut advancements = HashMap::new();
        let mut number = 0u32;

        // Match numbers of the previous round, in order.
        let mut previous: Vec<u32> = Vec::with_capacity(size / 2);
        for i in 0..size / 2 {
            number += 1;
            let m = Match::new(number, 1, seeds[i].clone(), seeds[size - 1 - i].clone());
            matches.insert(number, m);
            previous.push(number);
        }

        for round in 2..=rounds {
            let mut current = Vec::with_capacity(previous.len() / 2);
            for _ in 0..previous.len() / 2 {
                number += 1;
                matches.insert(number, Match::placeholder(number, round));
                current.push(number);
            }
            for (j, &source) in previous.iter().enumerate() {
                let color = if j % 2 == 0 {
                    AllianceColor::Red
                } else {
                    AllianceColor::Blue
                };
                advancements.insert(
                    source,
                    BracketAdvancement {
                        source,
                        target: current[j / 2],
                        color,
                    },
                );
            }
            previous = current;
        }

        info!(
            rounds,
            seeds = size,
            matches = matches.len(),
            "elimination bracket built"
        );
        Ok(Bracket {
            rounds,
            teams_per_alliance: self.teams_per_alliance,
            matches,
            advancements,
        })
    }
}
