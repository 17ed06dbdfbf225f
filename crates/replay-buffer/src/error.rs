//! Error types for replay-buffer operations.

use thiserror::Error;

/// Errors returned by [`crate::ReplayBuffer`] and
/// [`crate::PrioritizedReplayBuffer`].
///
/// Every variant corresponds to a validation failure that must leave the
/// buffer's state unchanged — no partial writes, no swallowed errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayBufferError {
    /// A field declared in the schema was not supplied to `add`.
    #[error("missing field: {name}")]
    MissingField {
        /// The field name that was required but absent.
        name: String,
    },

    /// A field was supplied to `add` that is not part of the schema.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The unrecognized field name.
        name: String,
    },

    /// A field's supplied data could not be reshaped to `(n, *field_shape)`.
    #[error("shape mismatch for field {name}: expected a multiple of {element_count} elements, got {got}")]
    ShapeMismatch {
        /// The field whose data didn't fit its declared shape.
        name: String,
        /// The field's element count (`prod(shape)`).
        element_count: usize,
        /// The number of values actually supplied.
        got: usize,
    },

    /// A field's supplied values cannot be coerced to the declared dtype
    /// without losing information (narrowing float to integer, negative to
    /// unsigned) or overflow.
    #[error("dtype mismatch for field {name}: value {value} is not representable as {dtype}")]
    DtypeMismatch {
        /// The offending field.
        name: String,
        /// The declared dtype the value could not be coerced to.
        dtype: String,
        /// The offending value, formatted for the error message.
        value: f64,
    },

    /// Two or more fields in the same `add` call implied different batch
    /// sizes `n`.
    #[error("batch size mismatch: field {name} implies n={got}, but n={expected} was already established")]
    BatchSizeMismatch {
        /// The field whose implied `n` disagreed with the rest of the call.
        name: String,
        /// The batch size established by earlier fields in this call.
        expected: usize,
        /// The batch size implied by `name`.
        got: usize,
    },

    /// A single `add` call supplied more rows than the buffer's capacity.
    #[error("batch of size {n} exceeds capacity {capacity}")]
    BatchTooLarge {
        /// The batch size requested.
        n: usize,
        /// The buffer's capacity.
        capacity: usize,
    },

    /// A priority was zero or negative.
    #[error("invalid priority {priority}: priorities must be strictly positive")]
    InvalidPriority {
        /// The offending priority value.
        priority: f64,
    },

    /// An index passed to `update_priorities` (or `_encode_sample`) was
    /// outside `[0, stored_size)`.
    #[error("index {index} out of range: stored_size is {stored_size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The buffer's current stored size.
        stored_size: usize,
    },

    /// `sample` was called on a buffer with `stored_size == 0`.
    #[error("cannot sample from an empty buffer")]
    EmptyBuffer,
}
