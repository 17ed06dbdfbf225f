//! Property-based tests covering the replay buffer's quantified invariants:
//! ring bookkeeping, `next_of` successor retrieval, and prioritized sampling.
//!
//! Coverage:
//! - ring cursor/stored-size bookkeeping under arbitrary add sequences
//! - ring-wrap preserves the most recently written value per physical slot
//! - `next_of` successor retrieval against a reference model
//! - prioritized sampling: bounded indexes, uniform weights under equal
//!   priorities, and `max_priority` monotonicity

use proptest::prelude::*;
use replay_buffer::{Dtype, FieldSpec, PrioritizedReplayBuffer, ReplayBuffer};

// =============================================================================
// INV-SEQ-01 / INV-SEQ-02: cursor and stored-size bookkeeping
// =============================================================================

proptest! {
    /// After any sequence of single-step adds, `next_index == k mod capacity`
    /// and `stored_size == min(k, capacity)`.
    #[test]
    fn prop_cursor_and_stored_size_track_add_count(
        capacity in 1usize..64,
        steps in 0usize..200,
    ) {
        let mut buffer = ReplayBuffer::new(capacity, vec![("x", FieldSpec::scalar(Dtype::F32))], None, None).unwrap();

        for i in 0..steps {
            buffer.add(&[("x", &[i as f64])]).unwrap();
        }

        prop_assert_eq!(buffer.get_next_index(), steps % capacity);
        prop_assert_eq!(buffer.get_stored_size(), steps.min(capacity));
    }

    /// The same invariant holds for a single batched add of size `n <= capacity`.
    #[test]
    fn prop_cursor_and_stored_size_track_batched_add(
        capacity in 1usize..64,
        prev in 0usize..64,
        n in 0usize..64,
    ) {
        let prev = prev % capacity;
        let n = n % (capacity + 1);

        let mut buffer = ReplayBuffer::new(capacity, vec![("x", FieldSpec::scalar(Dtype::F32))], None, None).unwrap();
        for i in 0..prev {
            buffer.add(&[("x", &[i as f64])]).unwrap();
        }
        let prev_stored = buffer.get_stored_size();
        let prev_index = buffer.get_next_index();

        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        buffer.add(&[("x", &values)]).unwrap();

        prop_assert_eq!(buffer.get_next_index(), (prev_index + n) % capacity);
        prop_assert_eq!(buffer.get_stored_size(), (prev_stored + n).min(capacity));
    }
}

// =============================================================================
// Ring semantics: sample returns the last value written to a physical slot
// =============================================================================

proptest! {
    #[test]
    fn prop_encode_sample_returns_last_write_per_slot(
        capacity in 1usize..32,
        steps in 0usize..150,
    ) {
        let mut buffer = ReplayBuffer::new(capacity, vec![("x", FieldSpec::scalar(Dtype::F32))], None, None).unwrap();
        for i in 0..steps {
            buffer.add(&[("x", &[i as f64])]).unwrap();
        }

        let stored = buffer.get_stored_size();
        if stored > 0 {
            let indexes: Vec<usize> = (0..stored).collect();
            let batch = buffer.encode_sample(&indexes).unwrap();

            // The step last written to physical slot `i` is the largest `k < steps`
            // with `k % capacity == i`.
            for i in 0..stored {
                let last_step = (0..steps).rev().find(|k| k % capacity == i).unwrap();
                prop_assert_eq!(batch.fields["x"].values[i], last_step as f64);
            }
        }
    }
}

// =============================================================================
// next_of: successor equals the observation one physical slot ahead
// =============================================================================

proptest! {
    #[test]
    fn prop_next_of_matches_reference_model(
        capacity in 2usize..32,
        steps in 1usize..150,
    ) {
        let mut buffer =
            ReplayBuffer::new(capacity, vec![("obs", FieldSpec::scalar(Dtype::F32))], Some("obs"), None).unwrap();

        for i in 0..steps {
            buffer.add(&[("obs", &[i as f64]), ("next_obs", &[(i + 1) as f64])]).unwrap();
        }

        let stored = buffer.get_stored_size();
        let next_index = buffer.get_next_index();
        let indexes: Vec<usize> = (0..stored).collect();
        let batch = buffer.encode_sample(&indexes).unwrap();

        for i in 0..stored {
            if (i + 1) % capacity != next_index {
                // next_obs[i] must equal obs[(i+1) % capacity]
                prop_assert_eq!(batch.fields["next_obs"].values[i], batch.fields["obs"].values[(i + 1) % capacity]);
            }
        }
    }
}

// =============================================================================
// Prioritized sampler: bounded indexes, uniform weights, monotone max_priority
// =============================================================================

proptest! {
    #[test]
    fn prop_prioritized_sample_indexes_are_bounded(
        capacity in 1usize..32,
        steps in 1usize..64,
        batch_size in 1usize..16,
    ) {
        let mut buffer = PrioritizedReplayBuffer::new(
            capacity,
            vec![("x", FieldSpec::scalar(Dtype::F32))],
            0.6,
            None,
            None,
        )
        .unwrap();

        for i in 0..steps {
            buffer.add(&[("x", &[i as f64])], None).unwrap();
        }

        let batch = buffer.sample(batch_size, 0.4).unwrap();
        let stored = buffer.get_stored_size();
        prop_assert_eq!(batch.indexes.len(), batch_size);
        prop_assert_eq!(batch.weights.len(), batch_size);
        for &idx in &batch.indexes {
            prop_assert!(idx < stored);
        }
    }

    /// With all priorities equal, every importance-sampling weight is 1.
    #[test]
    fn prop_equal_priorities_give_unit_weights(
        capacity in 4usize..32,
        priority in 0.1f64..10.0,
        batch_size in 1usize..16,
    ) {
        let mut buffer = PrioritizedReplayBuffer::new(
            capacity,
            vec![("x", FieldSpec::scalar(Dtype::F32))],
            0.6,
            None,
            None,
        )
        .unwrap();

        let values: Vec<f64> = (0..capacity).map(|i| i as f64).collect();
        let priorities = vec![priority; capacity];
        buffer.add(&[("x", &values)], Some(&priorities)).unwrap();

        let batch = buffer.sample(batch_size, 0.4).unwrap();
        for w in batch.weights {
            prop_assert!((w - 1.0).abs() < 1e-6, "expected weight 1.0, got {w}");
        }
    }

    /// `max_priority` never decreases across adds and priority updates.
    #[test]
    fn prop_max_priority_is_monotone(
        capacity in 4usize..32,
        priorities in prop::collection::vec(0.01f64..20.0, 1..20),
    ) {
        let mut buffer = PrioritizedReplayBuffer::new(
            capacity,
            vec![("x", FieldSpec::scalar(Dtype::F32))],
            0.6,
            None,
            None,
        )
        .unwrap();

        let mut last = buffer.get_max_priority();
        for &p in &priorities {
            buffer.add(&[("x", &[0.0])], Some(&[p])).unwrap();
            let now = buffer.get_max_priority();
            prop_assert!(now >= last);
            last = now;
        }
    }
}
