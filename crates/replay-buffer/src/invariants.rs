//! Debug assertion macros for replay-buffer invariants.
//!
//! These macros provide runtime checks for internal consistency
//! conditions that should always hold. They are only active in debug
//! builds (`#[cfg(debug_assertions)]`), so there is zero overhead in
//! release builds.

// =============================================================================
// INV-SEQ-01: Bounded stored size
// =============================================================================

/// Assert that `stored_size` never exceeds `capacity`.
///
/// Used in: `ColumnStore::write_batch` after updating `stored`.
macro_rules! debug_assert_bounded_stored {
    ($stored:expr, $capacity:expr) => {
        debug_assert!(
            $stored <= $capacity,
            "INV-SEQ-01 violated: stored_size {} exceeds capacity {}",
            $stored,
            $capacity
        )
    };
}

// =============================================================================
// INV-SEQ-02: Monotonic cursor
// =============================================================================

/// Assert that the write cursor only advances (mod capacity) by exactly `n`.
///
/// Used in: `ColumnStore::write_batch` after updating `cursor`.
macro_rules! debug_assert_cursor_advance {
    ($old:expr, $new:expr, $n:expr, $capacity:expr) => {
        debug_assert!(
            ($old + $n) % $capacity == $new,
            "INV-SEQ-02 violated: cursor {} + n {} should be {} but is {}",
            $old,
            $n,
            ($old + $n) % $capacity,
            $new
        )
    };
}

// =============================================================================
// INV-SAMPLE-01: Sampled indices in range
// =============================================================================

/// Assert that every sampled index lies in `[0, stored_size)`.
///
/// Used in: `UniformSampler::sample`, `PrioritizedSampler::sample`.
macro_rules! debug_assert_index_in_range {
    ($index:expr, $stored_size:expr) => {
        debug_assert!(
            $index < $stored_size,
            "INV-SAMPLE-01 violated: sampled index {} outside [0, {})",
            $index,
            $stored_size
        )
    };
}

// =============================================================================
// INV-PRI-01: Tree leaves mirror priority^alpha
// =============================================================================

/// Assert that a tree leaf value is non-negative (sum/min of `priority^alpha`
/// can never be negative).
///
/// Used in: `SegmentTree::set`.
macro_rules! debug_assert_nonnegative_leaf {
    ($value:expr) => {
        debug_assert!(
            $value >= 0.0,
            "INV-PRI-01 violated: tree leaf value {} is negative",
            $value
        )
    };
}

// =============================================================================
// INV-PRI-02: max_priority monotonicity
// =============================================================================

/// Assert that `max_priority` never decreases.
///
/// Used in: `PrioritizedReplayBuffer::add`, `update_priorities`.
macro_rules! debug_assert_max_priority_monotone {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-PRI-02 violated: max_priority decreased from {} to {}",
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_bounded_stored;
pub(crate) use debug_assert_cursor_advance;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_max_priority_monotone;
pub(crate) use debug_assert_nonnegative_leaf;
