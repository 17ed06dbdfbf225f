//! Sampled-batch output types.

use std::collections::HashMap;

/// One field's worth of sampled data: `n` flattened records, each of
/// `prod(shape)` elements, plus the per-record `shape` for reshaping on the
/// caller's side.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchField {
    /// Shape of one record of this field (no leading batch dimension).
    pub shape: Vec<usize>,
    /// Flattened values: `n` records of `prod(shape)` elements each,
    /// records concatenated in sample order.
    pub values: Vec<f64>,
}

/// A sampled or encoded batch, keyed by field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    pub fields: HashMap<String, BatchField>,
}

impl Batch {
    pub(crate) fn new() -> Self {
        Self { fields: HashMap::new() }
    }
}

/// A sampled batch from a [`crate::PrioritizedReplayBuffer`]: the same
/// field data as [`Batch`], plus the physical indexes drawn and their
/// importance-sampling weights.
#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizedBatch {
    pub fields: HashMap<String, BatchField>,
    /// Physical indexes sampled, in draw order. Pass back into
    /// `update_priorities` after computing TD-errors.
    pub indexes: Vec<usize>,
    /// Importance-sampling weights, normalized so the maximum weight in
    /// the buffer is `1.0`, parallel to `indexes`.
    pub weights: Vec<f64>,
}
