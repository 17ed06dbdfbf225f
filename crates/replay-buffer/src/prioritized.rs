//! Proportional-priority sampling state: the sum/min tree pair, stratified
//! sampling, importance-sampling weights, and `max_priority` tracking.
//!
//! Follows the `push`/`compute_is_weights`/`update_priorities` shape common
//! to prioritized-replay implementations, adapted to a sum/min tree split
//! and stratified-segment sampling.

use rand::Rng;

use crate::error::ReplayBufferError;
use crate::invariants::debug_assert_max_priority_monotone;
use crate::segment_tree::{MinTree, SumTree};

/// Sum/min tree pair plus `max_priority`, driving [`crate::PrioritizedReplayBuffer`].
#[derive(Debug, Clone)]
pub(crate) struct PrioritizedState {
    sum_tree: SumTree,
    min_tree: MinTree,
    max_priority: f64,
    alpha: f64,
}

impl PrioritizedState {
    pub(crate) fn new(capacity: usize, alpha: f64) -> Self {
        Self { sum_tree: SumTree::new(capacity), min_tree: MinTree::new(capacity), max_priority: 1.0, alpha }
    }

    pub(crate) fn max_priority(&self) -> f64 {
        self.max_priority
    }

    pub(crate) fn clear(&mut self) {
        self.sum_tree.clear();
        self.min_tree.clear();
        self.max_priority = 1.0;
    }

    /// Sets the leaves for `n` newly-written physical slots, starting at
    /// `head` and wrapping at `capacity`, to `max_priority^alpha` each.
    pub(crate) fn add_default(&mut self, head: usize, n: usize, capacity: usize) {
        let leaf = self.max_priority.powf(self.alpha);
        for row in 0..n {
            let slot = (head + row) % capacity;
            self.sum_tree.set(slot, leaf);
            self.min_tree.set(slot, leaf);
        }
    }

    /// Sets the leaves for `n` newly-written physical slots to
    /// `priorities[i]^alpha`, and raises `max_priority` to their supremum.
    pub(crate) fn add_with_priorities(
        &mut self,
        head: usize,
        capacity: usize,
        priorities: &[f64],
    ) -> Result<(), ReplayBufferError> {
        for &p in priorities {
            if !(p > 0.0) {
                return Err(ReplayBufferError::InvalidPriority { priority: p });
            }
        }

        for (row, &p) in priorities.iter().enumerate() {
            let slot = (head + row) % capacity;
            let leaf = p.powf(self.alpha);
            self.sum_tree.set(slot, leaf);
            self.min_tree.set(slot, leaf);
        }

        let batch_max = priorities.iter().copied().fold(f64::MIN, f64::max);
        let old = self.max_priority;
        self.max_priority = self.max_priority.max(batch_max);
        debug_assert_max_priority_monotone!(old, self.max_priority);
        Ok(())
    }

    /// Sets `tree[i] = p^alpha` for each `(index, priority)` pair, raising
    /// `max_priority` to their supremum.
    pub(crate) fn update_priorities(
        &mut self,
        indexes: &[usize],
        priorities: &[f64],
        stored_size: usize,
    ) -> Result<(), ReplayBufferError> {
        for &p in priorities {
            if !(p > 0.0) {
                return Err(ReplayBufferError::InvalidPriority { priority: p });
            }
        }
        for &i in indexes {
            if i >= stored_size {
                return Err(ReplayBufferError::IndexOutOfRange { index: i, stored_size });
            }
        }

        for (&i, &p) in indexes.iter().zip(priorities.iter()) {
            let leaf = p.powf(self.alpha);
            self.sum_tree.set(i, leaf);
            self.min_tree.set(i, leaf);
        }

        let batch_max = priorities.iter().copied().fold(f64::MIN, f64::max);
        let old = self.max_priority;
        self.max_priority = self.max_priority.max(batch_max);
        debug_assert_max_priority_monotone!(old, self.max_priority);
        Ok(())
    }

    /// Stratified proportional sampling: partitions `[0, total)` into
    /// `batch_size` equal segments, draws one uniform sample per segment,
    /// and maps each through `prefix_sum_index`. Returns `(indexes,
    /// weights)`.
    pub(crate) fn sample(
        &self,
        stored_size: usize,
        batch_size: usize,
        beta: f64,
        rng: &mut impl Rng,
    ) -> Result<(Vec<usize>, Vec<f64>), ReplayBufferError> {
        if stored_size == 0 {
            return Err(ReplayBufferError::EmptyBuffer);
        }

        let total = self.sum_tree.root();
        let segment = total / batch_size as f64;

        let mut indexes = Vec::with_capacity(batch_size);
        for k in 0..batch_size {
            let low = segment * k as f64;
            let high = segment * (k + 1) as f64;
            let sample = rng.gen_range(low..high.max(low + f64::EPSILON));
            let clamped = sample.min(total - f64::EPSILON).max(0.0);
            indexes.push(self.sum_tree.prefix_sum_index(clamped));
        }

        let p_min = self.min_tree.query_range(0, stored_size) / total;
        let max_w = (p_min * stored_size as f64).powf(-beta);

        let weights = indexes
            .iter()
            .map(|&idx| {
                let leaf = self.sum_tree.query_range(idx, idx + 1);
                let prob = leaf / total;
                (prob * stored_size as f64).powf(-beta) / max_w
            })
            .collect();

        Ok((indexes, weights))
    }
}
