//! replay-buffer — a columnar, single-writer replay buffer for
//! reinforcement-learning training loops.
//!
//! A [`ReplayBuffer`] is a fixed-capacity ring of named, typed, shape-bearing
//! columns. Interaction-loop code calls [`ReplayBuffer::add`] at high
//! throughput (scalar or batched); a learner calls [`ReplayBuffer::sample`]
//! to draw a uniformly-random minibatch. [`PrioritizedReplayBuffer`] adds
//! proportional priority sampling on top of the same column storage, using a
//! sum-tree/min-tree pair for O(log capacity) sampling and importance-weight
//! computation.
//!
//! Two storage linkages keep memory proportional to what is actually novel
//! per step:
//!
//! - `next_of`: a field's successor is derived from the next physical slot
//!   plus a single-slot boundary cache, eliding a dedicated `next_X` column.
//! - `stack_compress`: overlapping frame stacks are stored in one rolling
//!   column of length `capacity + stack_depth - 1`, reconstructed as a
//!   windowed view on read.
//!
//! # Example
//!
//! ```
//! use replay_buffer::{Dtype, FieldSpec, ReplayBuffer};
//!
//! let mut buffer = ReplayBuffer::new(
//!     1024,
//!     vec![
//!         ("obs", FieldSpec::shaped(vec![4])),
//!         ("act", FieldSpec::scalar(Dtype::I32)),
//!         ("rew", FieldSpec::scalar(Dtype::F32)),
//!     ],
//!     None,
//!     None,
//! )
//! .unwrap();
//!
//! buffer.add(&[("obs", &[0.0, 1.0, 2.0, 3.0]), ("act", &[1.0]), ("rew", &[0.5])]).unwrap();
//! let batch = buffer.sample(1).unwrap();
//! assert_eq!(batch.fields["obs"].values.len(), 4);
//! ```

mod batch;
mod buffer;
mod column;
mod dtype;
mod error;
mod invariants;
mod linkage;
mod prioritized;
mod prioritized_buffer;
mod ring_index;
mod sampler;
mod schema;
mod segment_tree;
mod stats;

pub use batch::{Batch, BatchField, PrioritizedBatch};
pub use buffer::ReplayBuffer;
pub use dtype::Dtype;
pub use error::ReplayBufferError;
pub use prioritized_buffer::PrioritizedReplayBuffer;
pub use schema::FieldSpec;
pub use stats::Stats;
