//! Rolling statistics for the selected web of each generation.

use std::collections::{BTreeMap, VecDeque};

use crate::mutation::MutationKind;
use crate::simulation::StepOutcome;

/// Bounded history of one metric; the oldest sample is dropped first.
pub struct History {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.samples.back().copied()
    }
}

/// Recent history of the lineage plus a tally of which mutations won
/// selection. Histories keep the last `capacity` generations; counters cover
/// the whole run.
pub struct LineageStats {
    pub efficiency: History,
    pub caught: History,
    pub net_length: History,
    pub ring_count: History,

    pub mutation_wins: BTreeMap<MutationKind, u64>,
    pub parent_kept: u64,
    pub failed_steps: u64,
}

impl LineageStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            efficiency: History::with_capacity(capacity),
            caught: History::with_capacity(capacity),
            net_length: History::with_capacity(capacity),
            ring_count: History::with_capacity(capacity),
            mutation_wins: BTreeMap::new(),
            parent_kept: 0,
            failed_steps: 0,
        }
    }

    pub fn record(&mut self, outcome: &StepOutcome) {
        match outcome.winner {
            Some(kind) => *self.mutation_wins.entry(kind).or_insert(0) += 1,
            None => self.parent_kept += 1,
        }
        self.efficiency.push(outcome.efficiency);
        self.caught.push(outcome.caught as f64);
        self.net_length.push(outcome.net_length);
        self.ring_count.push(outcome.ring_count as f64);
    }

    pub fn record_failure(&mut self) {
        self.failed_steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(generation: u64, winner: Option<MutationKind>) -> StepOutcome {
        StepOutcome {
            generation,
            efficiency: generation as f64,
            caught: 3,
            net_length: 900.0,
            ring_count: 2,
            winner,
        }
    }

    #[test]
    fn history_keeps_only_the_newest_samples() {
        let mut history = History::with_capacity(3);
        for v in 1..=5 {
            history.push(v as f64);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), [3.0, 4.0, 5.0]);
        assert_eq!(history.last(), Some(5.0));
    }

    #[test]
    fn histories_are_bounded_but_winners_count_the_whole_run() {
        let mut stats = LineageStats::new(2);

        stats.record(&outcome(2, Some(MutationKind::AddRing)));
        stats.record(&outcome(3, None));
        stats.record(&outcome(4, Some(MutationKind::AddRing)));

        assert_eq!(stats.efficiency.iter().collect::<Vec<_>>(), [3.0, 4.0]);
        assert_eq!(stats.ring_count.len(), 2);
        assert_eq!(stats.mutation_wins.get(&MutationKind::AddRing), Some(&2));
        assert_eq!(stats.parent_kept, 1);
    }
}
