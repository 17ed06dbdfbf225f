//! The prioritized replay buffer façade: [`crate::buffer::Core`] plus a
//! sum/min tree pair driving proportional sampling and importance-sampling
//! weights.

use crate::batch::{Batch, PrioritizedBatch};
use crate::buffer::Core;
use crate::error::ReplayBufferError;
use crate::prioritized::PrioritizedState;
use crate::schema::FieldSpec;
use crate::stats::Stats;

/// A fixed-capacity, columnar replay buffer with proportional priority
/// sampling.
///
/// Shares [`Core`]'s storage and linkage machinery with [`crate::ReplayBuffer`],
/// adding a sum-tree/min-tree pair over physical slots. New records are
/// assigned `max_priority` unless an explicit priority is supplied;
/// `sample` draws proportionally to `priority^alpha` and returns
/// importance-sampling weights normalized to the batch's own maximum.
pub struct PrioritizedReplayBuffer {
    core: Core,
    priorities: PrioritizedState,
}

impl PrioritizedReplayBuffer {
    pub fn new(
        capacity: usize,
        fields: Vec<(&str, FieldSpec)>,
        alpha: f64,
        next_of: Option<&str>,
        stack_compress: Option<&str>,
    ) -> Result<Self, ReplayBufferError> {
        let core = Core::new(capacity, fields, next_of, stack_compress)?;
        Ok(Self { core, priorities: PrioritizedState::new(capacity, alpha) })
    }

    /// Appends `n` records. When `priorities` is `None`, every new record
    /// is assigned the buffer's current `max_priority`; when supplied, it
    /// must have exactly `n` entries, each strictly positive, and
    /// `max_priority` is raised to their supremum.
    pub fn add(&mut self, fields: &[(&str, &[f64])], priorities: Option<&[f64]>) -> Result<usize, ReplayBufferError> {
        let head = self.core.get_next_index();
        let capacity = self.core.capacity();

        if let Some(priorities) = priorities {
            let n = self.core.add(fields)?;
            if priorities.len() != n {
                return Err(ReplayBufferError::BatchSizeMismatch {
                    name: "priorities".to_string(),
                    expected: n,
                    got: priorities.len(),
                });
            }
            self.priorities.add_with_priorities(head, capacity, priorities)?;
            Ok(n)
        } else {
            let n = self.core.add(fields)?;
            self.priorities.add_default(head, n, capacity);
            Ok(n)
        }
    }

    /// Draws `batch_size` physical indexes proportionally to
    /// `priority^alpha`, encodes them, and computes importance-sampling
    /// weights at exponent `beta`.
    pub fn sample(&mut self, batch_size: usize, beta: f64) -> Result<PrioritizedBatch, ReplayBufferError> {
        let mut rng = rand::thread_rng();
        let (indexes, weights) = self.priorities.sample(self.core.get_stored_size(), batch_size, beta, &mut rng)?;
        let Batch { fields } = self.core.encode_sample(&indexes)?;
        self.core.record_sample(indexes.len());
        Ok(PrioritizedBatch { fields, indexes, weights })
    }

    /// Sets `priority[i]` for each of `indexes`, raising `max_priority` to
    /// their supremum if needed.
    pub fn update_priorities(&mut self, indexes: &[usize], priorities: &[f64]) -> Result<(), ReplayBufferError> {
        if indexes.len() != priorities.len() {
            return Err(ReplayBufferError::BatchSizeMismatch {
                name: "priorities".to_string(),
                expected: indexes.len(),
                got: priorities.len(),
            });
        }
        self.priorities.update_priorities(indexes, priorities, self.core.get_stored_size())?;
        self.core.record_priority_update();
        Ok(())
    }

    /// The current supremum of every priority ever assigned (monotonically
    /// nondecreasing, reset to `1.0` by `clear`).
    pub fn get_max_priority(&self) -> f64 {
        self.priorities.max_priority()
    }

    /// Gathers the given physical indexes into a [`Batch`], without
    /// drawing any new ones or returning importance-sampling weights.
    pub fn encode_sample(&self, indexes: &[usize]) -> Result<Batch, ReplayBufferError> {
        self.core.encode_sample(indexes)
    }

    pub fn get_next_index(&self) -> usize {
        self.core.get_next_index()
    }

    pub fn get_stored_size(&self) -> usize {
        self.core.get_stored_size()
    }

    /// Resets the buffer to empty, zeroing every column and every
    /// priority, and resetting `max_priority` to `1.0`.
    pub fn clear(&mut self) {
        self.core.clear();
        self.priorities.clear();
    }

    pub fn stats(&self) -> Stats {
        self.core.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Dtype;

    fn prioritized_buffer(capacity: usize, alpha: f64) -> PrioritizedReplayBuffer {
        PrioritizedReplayBuffer::new(
            capacity,
            vec![("obs", FieldSpec::scalar(Dtype::F32)), ("rew", FieldSpec::scalar(Dtype::F32))],
            alpha,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn add_without_priority_uses_max_priority() {
        let mut buffer = prioritized_buffer(8, 0.6);
        buffer.add(&[("obs", &[1.0]), ("rew", &[1.0])], None).unwrap();
        assert_eq!(buffer.get_max_priority(), 1.0);
    }

    #[test]
    fn add_with_priority_raises_max_priority() {
        let mut buffer = prioritized_buffer(8, 0.6);
        buffer.add(&[("obs", &[1.0]), ("rew", &[1.0])], Some(&[5.0])).unwrap();
        assert_eq!(buffer.get_max_priority(), 5.0);
    }

    #[test]
    fn priority_count_must_match_batch_size() {
        let mut buffer = prioritized_buffer(8, 0.6);
        let result = buffer.add(&[("obs", &[1.0, 2.0]), ("rew", &[1.0, 1.0])], Some(&[5.0]));
        assert!(matches!(result, Err(ReplayBufferError::BatchSizeMismatch { .. })));
    }

    #[test]
    fn sample_returns_weights_and_indexes_of_equal_length() {
        let mut buffer = prioritized_buffer(8, 0.6);
        for i in 0..8 {
            buffer.add(&[("obs", &[i as f64]), ("rew", &[1.0])], None).unwrap();
        }
        let batch = buffer.sample(4, 0.4).unwrap();
        assert_eq!(batch.indexes.len(), 4);
        assert_eq!(batch.weights.len(), 4);
    }

    #[test]
    fn update_priorities_rejects_mismatched_lengths() {
        let mut buffer = prioritized_buffer(8, 0.6);
        buffer.add(&[("obs", &[1.0]), ("rew", &[1.0])], None).unwrap();
        let result = buffer.update_priorities(&[0, 1], &[1.0]);
        assert!(matches!(result, Err(ReplayBufferError::BatchSizeMismatch { .. })));
    }

    #[test]
    fn sample_and_update_priorities_record_stats() {
        let mut buffer = prioritized_buffer(8, 0.6);
        for i in 0..8 {
            buffer.add(&[("obs", &[i as f64]), ("rew", &[1.0])], None).unwrap();
        }
        let batch = buffer.sample(4, 0.4).unwrap();
        buffer.update_priorities(&batch.indexes, &vec![1.0; batch.indexes.len()]).unwrap();

        let stats = buffer.stats();
        assert_eq!(stats.sample_calls, 1);
        assert_eq!(stats.records_sampled, 4);
        assert_eq!(stats.priority_updates, 1);
    }

    #[test]
    fn clear_resets_max_priority() {
        let mut buffer = prioritized_buffer(8, 0.6);
        buffer.add(&[("obs", &[1.0]), ("rew", &[1.0])], Some(&[9.0])).unwrap();
        buffer.clear();
        assert_eq!(buffer.get_max_priority(), 1.0);
        assert_eq!(buffer.get_stored_size(), 0);
    }
}
