//! Typed column storage and batched, ring-aware read/write.
//!
//! Generalizes a lock-free ring buffer's contiguous-span reservation and
//! commit logic (including its two-run wrap handling) from a single
//! homogeneous element type to a named, multi-dtype column. Polymorphism
//! lives over fields, not over records: each column is one variant of
//! [`ColumnStorage`], chosen once at construction, so the hot path never
//! branches per record.

use crate::dtype::Dtype;
use crate::error::ReplayBufferError;
use crate::ring_index;

/// One contiguous, homogeneously-typed column buffer.
#[derive(Debug, Clone)]
pub(crate) enum ColumnStorage {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    /// Stored packed one byte per element (`0` or `1`).
    Bool(Vec<u8>),
}

impl ColumnStorage {
    pub(crate) fn new(dtype: Dtype, len: usize) -> Self {
        match dtype {
            Dtype::F32 => Self::F32(vec![0.0; len]),
            Dtype::F64 => Self::F64(vec![0.0; len]),
            Dtype::I32 => Self::I32(vec![0; len]),
            Dtype::I64 => Self::I64(vec![0; len]),
            Dtype::U8 => Self::U8(vec![0; len]),
            Dtype::U16 => Self::U16(vec![0; len]),
            Dtype::Bool => Self::Bool(vec![0; len]),
        }
    }

    pub(crate) fn dtype(&self) -> Dtype {
        match self {
            Self::F32(_) => Dtype::F32,
            Self::F64(_) => Dtype::F64,
            Self::I32(_) => Dtype::I32,
            Self::I64(_) => Dtype::I64,
            Self::U8(_) => Dtype::U8,
            Self::U16(_) => Dtype::U16,
            Self::Bool(_) => Dtype::Bool,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Validates that every value in `values` is representable as this
    /// column's dtype, without mutating anything. Called before any field
    /// in an `add` call is written, so a failure anywhere leaves the whole
    /// buffer untouched.
    pub(crate) fn validate(&self, name: &str, values: &[f64]) -> Result<(), ReplayBufferError> {
        validate_dtype(self.dtype(), name, values)
    }

    /// Writes `values` starting at flat element offset `offset`.
    ///
    /// Callers must have validated `values` already; this never fails.
    pub(crate) fn write_at(&mut self, offset: usize, values: &[f64]) {
        match self {
            Self::F32(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = value as f32;
                }
            }
            Self::F64(v) => {
                v[offset..offset + values.len()].copy_from_slice(values);
            }
            Self::I32(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = value as i32;
                }
            }
            Self::I64(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = value as i64;
                }
            }
            Self::U8(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = value as u8;
                }
            }
            Self::U16(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = value as u16;
                }
            }
            Self::Bool(v) => {
                for (i, &value) in values.iter().enumerate() {
                    v[offset + i] = if value != 0.0 { 1 } else { 0 };
                }
            }
        }
    }

    /// Gathers `count` values starting at flat element offset `offset`,
    /// widened back to `f64`.
    pub(crate) fn read_at(&self, offset: usize, count: usize) -> Vec<f64> {
        match self {
            Self::F32(v) => v[offset..offset + count].iter().map(|&x| f64::from(x)).collect(),
            Self::F64(v) => v[offset..offset + count].to_vec(),
            Self::I32(v) => v[offset..offset + count].iter().map(|&x| f64::from(x)).collect(),
            Self::I64(v) => v[offset..offset + count].iter().map(|&x| x as f64).collect(),
            Self::U8(v) => v[offset..offset + count].iter().map(|&x| f64::from(x)).collect(),
            Self::U16(v) => v[offset..offset + count].iter().map(|&x| f64::from(x)).collect(),
            Self::Bool(v) => v[offset..offset + count].iter().map(|&x| f64::from(x)).collect(),
        }
    }
}

/// Checks every value in `values` against `dtype`, without requiring a
/// backing [`ColumnStorage`]. Used to validate `next_X` input, which is
/// checked against its source field's dtype but never itself stored.
pub(crate) fn validate_dtype(dtype: Dtype, name: &str, values: &[f64]) -> Result<(), ReplayBufferError> {
    for &value in values {
        if !dtype.accepts(value) {
            return Err(ReplayBufferError::DtypeMismatch { name: name.to_string(), dtype: dtype.to_string(), value });
        }
    }
    Ok(())
}

/// Writes `values` (flattened rows of `n` records, `element_count` wide
/// each) into a plain ring column at physical head `head`, splitting into
/// one or two contiguous runs when the batch wraps.
pub(crate) fn write_ring_batch(
    storage: &mut ColumnStorage,
    head: usize,
    n: usize,
    capacity: usize,
    element_count: usize,
    values: &[f64],
) {
    let (first, second) = ring_index::split(head, n, capacity);

    storage.write_at(first.offset * element_count, &values[..first.len * element_count]);
    if let Some(second) = second {
        storage.write_at(0, &values[first.len * element_count..(first.len + second.len) * element_count]);
        debug_assert_eq!(second.offset, 0);
    }
}

/// Gathers `indices` (each in `[0, capacity)`) from a plain ring column,
/// `element_count` values per row.
pub(crate) fn read_ring_rows(storage: &ColumnStorage, indices: &[usize], element_count: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(indices.len() * element_count);
    for &idx in indices {
        out.extend(storage.read_at(idx * element_count, element_count));
    }
    out
}
