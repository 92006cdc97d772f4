//! Even distribution of matches over physical fields.
//!
//! Each pick goes to the least-used field; ties are broken uniformly at
//! random among the least-used. Picks must be made in match order.

use tracing::debug;
use tourney_core::{Field, FieldId, Match};

use crate::error::{ScheduleError, ScheduleResult};
use crate::random::RandomSource;

#[derive(Debug, Clone)]
pub struct FieldBalancer {
    fields: Vec<FieldId>,
    counts: Vec<u32>,
}

impl FieldBalancer {
    pub fn new(fields: &[Field]) -> ScheduleResult<Self> {
        if fields.is_empty() {
            return Err(ScheduleError::EmptyFieldSet);
        }
        Ok(Self {
            fields: fields.iter().map(|f| f.id.clone()).collect(),
            counts: vec![0; fields.len()],
        })
    }

    /// Start from the field usage already present in `prior` matches,
    /// so balancing continues across rounds generated separately.
    pub fn with_history(fields: &[Field], prior: &[Match]) -> ScheduleResult<Self> {
        let mut balancer = Self::new(fields)?;
        for field in prior.iter().filter_map(|m| m.field.as_ref()) {
            if let Some(i) = balancer.fields.iter().position(|f| f == field) {
                balancer.counts[i] += 1;
            }
        }
        Ok(balancer)
    }

    /// Choose a field for the next match and count it.
    pub fn next_field(&mut self, rng: &mut dyn RandomSource) -> FieldId {
        let min = self.counts.iter().copied().min().unwrap_or(0);
        let candidates: Vec<usize> = self
            .counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == min)
            .map(|(i, _)| i)
            .collect();
        let pick = candidates[rng.next_index(candidates.len())];
        self.counts[pick] += 1;
        debug!(field = %self.fields[pick], count = self.counts[pick], "field assigned");
        self.fields[pick].clone()
    }

    /// Assign fields to every match, in order.
    pub fn assign_all(&mut self, matches: &mut [Match], rng: &mut dyn RandomSource) {
        for m in matches {
            m.field = Some(self.next_field(rng));
        }
    }

    /// Field id → matches assigned so far.
    pub fn counts(&self) -> impl Iterator<Item = (&FieldId, u32)> {
        self.fields.iter().zip(self.counts.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    fn fields(n: usize) -> Vec<Field> {
        (1..=n)
            .map(|i| Field {
                id: format!("field-{i}"),
                name: format!("Field {i}"),
            })
            .collect()
    }

    #[test]
    fn empty_field_set_fails() {
        assert!(matches!(
            FieldBalancer::new(&[]),
            Err(ScheduleError::EmptyFieldSet)
        ));
    }

    #[test]
    fn counts_stay_within_one() {
        let mut rng = seeded(2);
        for (field_count, matches) in [(1, 7), (2, 9), (3, 10), (5, 23)] {
            let mut balancer = FieldBalancer::new(&fields(field_count)).unwrap();
            for _ in 0..matches {
                balancer.next_field(&mut rng);
            }
            let counts: Vec<u32> = balancer.counts().map(|(_, c)| c).collect();
            let max = counts.iter().max().unwrap();
            let min = counts.iter().min().unwrap();
            assert!(max - min <= 1, "counts {counts:?}");
            assert_eq!(counts.iter().sum::<u32>(), matches);
        }
    }

    #[test]
    fn assigns_every_match_in_order() {
        let mut matches: Vec<Match> = (1..=4)
            .map(|n| Match::new(n, 1, vec![1, 2], vec![3, 4]))
            .collect();
        let mut balancer = FieldBalancer::new(&fields(2)).unwrap();
        balancer.assign_all(&mut matches, &mut seeded(0));

        assert!(matches.iter().all(|m| m.field.is_some()));
        // Each pair of consecutive matches covers both fields.
        assert_ne!(matches[0].field, matches[1].field);
        assert_ne!(matches[2].field, matches[3].field);
    }

    #[test]
    fn history_primes_counts() {
        let mut prior = Match::new(1, 1, vec![1, 2], vec![3, 4]);
        prior.field = Some("field-1".to_string());
        let mut balancer = FieldBalancer::with_history(&fields(2), &[prior]).unwrap();
        assert_eq!(balancer.next_field(&mut seeded(9)), "field-2");
    }
}
