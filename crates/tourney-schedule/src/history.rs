//! Opponent history within a stage.
//!
//! Built by scanning the alliance rosters of every prior match. The
//! Swiss pairing engine uses it to choose how a four-team group splits
//! into two alliances.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use tourney_core::{Match, TeamIndex};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupHistory {
    opponents: BTreeMap<TeamIndex, BTreeSet<TeamIndex>>,
}

impl MatchupHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matches(matches: &[Match]) -> Self {
        let mut history = Self::new();
        for m in matches {
            history.record(m);
        }
        history
    }

    /// Record every cross-alliance pairing of a match.
    pub fn record(&mut self, m: &Match) {
        for &red in &m.red {
            for &blue in &m.blue {
                self.opponents.entry(red).or_default().insert(blue);
                self.opponents.entry(blue).or_default().insert(red);
            }
        }
    }

    pub fn has_played(&self, a: TeamIndex, b: TeamIndex) -> bool {
        self.opponents.get(&a).is_some_and(|o| o.contains(&b))
    }

    pub fn opponents(&self, team: TeamIndex) -> impl Iterator<Item = TeamIndex> + '_ {
        self.opponents.get(&team).into_iter().flatten().copied()
    }

    /// Number of cross-alliance pairs that have already met.
    pub fn repeat_penalty(&self, red: &[TeamIndex], blue: &[TeamIndex]) -> u32 {
        red.iter()
            .flat_map(|&r| blue.iter().map(move |&b| (r, b)))
            .filter(|&(r, b)| self.has_played(r, b))
            .count() as u32
    }

    /// Split four teams into RED and BLUE pairs with the fewest repeat
    /// opponents. Of the three possible splits the default (first two
    /// RED, last two BLUE) wins ties.
    pub fn best_split(&self, group: [TeamIndex; 4]) -> ([TeamIndex; 2], [TeamIndex; 2]) {
        let [a, b, c, d] = group;
        let splits = [([a, b], [c, d]), ([a, c], [b, d]), ([a, d], [b, c])];

        let mut best = splits[0];
        let mut best_penalty = self.repeat_penalty(&best.0, &best.1);
        for split in &splits[1..] {
            let penalty = self.repeat_penalty(&split.0, &split.1);
            if penalty < best_penalty {
                best = *split;
                best_penalty = penalty;
            }
        }
        debug!(?group, red = ?best.0, blue = ?best.1, repeats = best_penalty, "alliance split chosen");
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_both_directions() {
        let history = MatchupHistory::from_matches(&[Match::new(1, 1, vec![1, 2], vec![3, 4])]);
        assert!(history.has_played(1, 3));
        assert!(history.has_played(4, 2));
        assert!(!history.has_played(1, 2));
        assert_eq!(history.opponents(1).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(history.opponents(9).count(), 0);
    }

    #[test]
    fn penalty_counts_cross_pairs() {
        let history = MatchupHistory::from_matches(&[Match::new(1, 1, vec![1, 2], vec![3, 4])]);
        assert_eq!(history.repeat_penalty(&[1, 2], &[3, 4]), 4);
        assert_eq!(history.repeat_penalty(&[1, 3], &[2, 4]), 2);
        assert_eq!(history.repeat_penalty(&[5, 6], &[7, 8]), 0);
    }

    #[test]
    fn empty_history_keeps_default_split() {
        let history = MatchupHistory::new();
        assert_eq!(history.best_split([1, 2, 3, 4]), ([1, 2], [3, 4]));
    }

    #[test]
    fn split_avoids_previous_opponents() {
        // 1 and 2 already faced 3 and 4 respectively.
        let history = MatchupHistory::from_matches(&[
            Match::new(1, 1, vec![1, 5], vec![3, 6]),
            Match::new(2, 1, vec![2, 7], vec![4, 8]),
        ]);
        // Default split puts 1,2 against 3,4 (two repeats); pairing 1 with 3
        // and 2 with 4 avoids both.
        assert_eq!(history.best_split([1, 2, 3, 4]), ([1, 3], [2, 4]));
    }
}
