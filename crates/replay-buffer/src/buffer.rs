//! The non-prioritized replay buffer façade: a fixed-capacity ring of
//! typed columns with optional `next_of` and `stack_compress` linkage.

use std::collections::HashMap;

use crate::batch::{Batch, BatchField};
use crate::column::{self, ColumnStorage};
use crate::error::ReplayBufferError;
use crate::invariants::{debug_assert_bounded_stored, debug_assert_cursor_advance, debug_assert_index_in_range};
use crate::linkage::{self, NextOfCache};
use crate::ring_index;
use crate::sampler;
use crate::schema::{FieldSpec, Layout, Schema};
use crate::stats::Stats;

/// Shared ring-buffer bookkeeping used by both [`ReplayBuffer`] and
/// [`crate::PrioritizedReplayBuffer`].
pub(crate) struct Core {
    schema: Schema,
    capacity: usize,
    columns: HashMap<String, ColumnStorage>,
    next_of_cache: Option<NextOfCache>,
    head: usize,
    stored_size: usize,
    stats: Stats,
}

impl Core {
    pub(crate) fn new(
        capacity: usize,
        fields: Vec<(&str, FieldSpec)>,
        next_of: Option<&str>,
        stack_compress: Option<&str>,
    ) -> Result<Self, ReplayBufferError> {
        assert!(capacity > 0, "replay buffer capacity must be nonzero");

        let schema = Schema::compile(&fields, next_of, stack_compress)?;

        let mut columns = HashMap::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let len = match field.layout {
                Layout::Plain | Layout::NextOfSource => capacity,
                Layout::StackCompressed { stack_depth } => capacity + stack_depth - 1,
            };
            let per_slot_elements = match field.layout {
                Layout::StackCompressed { stack_depth } => field.spec.element_count() / stack_depth,
                Layout::Plain | Layout::NextOfSource => field.spec.element_count(),
            };
            columns.insert(field.name.clone(), ColumnStorage::new(field.spec.dtype, len * per_slot_elements));
        }

        let next_of_cache = schema
            .next_of_source()
            .map(|source| NextOfCache::new(source.spec.dtype, source.spec.element_count()));

        Ok(Self { schema, capacity, columns, next_of_cache, head: 0, stored_size: 0, stats: Stats::new() })
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn get_next_index(&self) -> usize {
        self.head
    }

    pub(crate) fn get_stored_size(&self) -> usize {
        self.stored_size
    }

    pub(crate) fn stats(&self) -> Stats {
        self.stats
    }

    pub(crate) fn record_sample(&mut self, n: usize) {
        self.stats.record_sample(n);
    }

    pub(crate) fn record_priority_update(&mut self) {
        self.stats.record_priority_update();
    }

    pub(crate) fn clear(&mut self) {
        for field in &self.schema.fields {
            let column = self.columns.get_mut(&field.name).expect("column exists for every schema field");
            *column = ColumnStorage::new(column.dtype(), column.len());
        }
        if let Some(cache) = &mut self.next_of_cache {
            if let Some(source) = self.schema.next_of_source() {
                *cache = NextOfCache::new(source.spec.dtype, source.spec.element_count());
            }
        }
        self.head = 0;
        self.stored_size = 0;
    }

    /// Validates and writes one batch, returning the number of rows
    /// written. Leaves every column untouched if validation fails anywhere
    /// (checked before any write).
    pub(crate) fn add(&mut self, fields: &[(&str, &[f64])]) -> Result<usize, ReplayBufferError> {
        let provided: HashMap<&str, &[f64]> = fields.iter().map(|&(name, values)| (name, values)).collect();
        let required = self.schema.input_field_names();

        for name in &required {
            if !provided.contains_key(name.as_str()) {
                return Err(ReplayBufferError::MissingField { name: name.clone() });
            }
        }
        for &(name, _) in fields {
            if !required.iter().any(|r| r == name) {
                return Err(ReplayBufferError::UnknownField { name: name.to_string() });
            }
        }

        let mut n: Option<usize> = None;
        for name in &required {
            let (dtype, element_count) = self.field_dtype_and_element_count(name);
            let values = provided[name.as_str()];

            if element_count == 0 || values.len() % element_count != 0 {
                return Err(ReplayBufferError::ShapeMismatch {
                    name: name.clone(),
                    element_count,
                    got: values.len(),
                });
            }
            column::validate_dtype(dtype, name, values)?;

            let this_n = values.len() / element_count;
            match n {
                None => n = Some(this_n),
                Some(expected) if expected != this_n => {
                    return Err(ReplayBufferError::BatchSizeMismatch { name: name.clone(), expected, got: this_n });
                }
                _ => {}
            }
        }
        let n = n.unwrap_or(0);

        if n > self.capacity {
            return Err(ReplayBufferError::BatchTooLarge { n, capacity: self.capacity });
        }

        self.write_batch(n, &provided);
        Ok(n)
    }

    fn field_dtype_and_element_count(&self, name: &str) -> (crate::dtype::Dtype, usize) {
        if let Some(field) = self.schema.field(name) {
            return (field.spec.dtype, field.spec.element_count());
        }
        let source = self.schema.next_of_source().expect("next_X field must alias a declared source field");
        (source.spec.dtype, source.spec.element_count())
    }

    fn write_batch(&mut self, n: usize, provided: &HashMap<&str, &[f64]>) {
        if n == 0 {
            return;
        }

        let head = self.head;
        let capacity = self.capacity;

        for field in &self.schema.fields {
            let values = provided[field.name.as_str()];
            let storage = self.columns.get_mut(&field.name).expect("column exists for every schema field");

            match field.layout {
                Layout::Plain | Layout::NextOfSource => {
                    column::write_ring_batch(storage, head, n, capacity, field.spec.element_count(), values);
                }
                Layout::StackCompressed { stack_depth } => {
                    let inner_element_count = field.spec.element_count() / stack_depth;
                    linkage::write_stack_compressed_batch(
                        storage,
                        head,
                        n,
                        capacity,
                        stack_depth,
                        inner_element_count,
                        values,
                    );
                }
            }
        }

        if let (Some(cache), Some(next_name)) = (&mut self.next_of_cache, self.schema.next_field_name()) {
            let next_values = provided[next_name.as_str()];
            let source = self.schema.next_of_source().expect("next_of_cache implies a source field");
            let element_count = source.spec.element_count();
            cache.update(element_count, &next_values[(n - 1) * element_count..n * element_count]);
        }

        let wrapped = head + n > capacity;
        let new_head = ring_index::advance(head, n, capacity);
        self.stored_size = ring_index::saturating_stored(self.stored_size, n, capacity);
        debug_assert_bounded_stored!(self.stored_size, capacity);
        debug_assert_cursor_advance!(head, new_head, n, capacity);
        self.head = new_head;

        self.stats.record_add(n, wrapped);
    }

    pub(crate) fn encode_sample(&self, indexes: &[usize]) -> Result<Batch, ReplayBufferError> {
        for &index in indexes {
            if index >= self.stored_size {
                return Err(ReplayBufferError::IndexOutOfRange { index, stored_size: self.stored_size });
            }
            debug_assert_index_in_range!(index, self.stored_size);
        }

        let mut batch = Batch::new();
        for field in &self.schema.fields {
            let storage = &self.columns[&field.name];
            let values = match field.layout {
                Layout::Plain | Layout::NextOfSource => {
                    column::read_ring_rows(storage, indexes, field.spec.element_count())
                }
                Layout::StackCompressed { stack_depth } => {
                    let inner_element_count = field.spec.element_count() / stack_depth;
                    indexes
                        .iter()
                        .flat_map(|&idx| linkage::read_stack_compressed_row(storage, idx, stack_depth, inner_element_count))
                        .collect()
                }
            };
            batch.fields.insert(field.name.clone(), BatchField { shape: field.spec.shape.clone(), values });
        }

        if let (Some(cache), Some(next_name), Some(source)) =
            (&self.next_of_cache, self.schema.next_field_name(), self.schema.next_of_source())
        {
            let element_count = source.spec.element_count();
            let storage = &self.columns[&source.name];
            let mut values = Vec::with_capacity(indexes.len() * element_count);
            for &index in indexes {
                if linkage::next_of_uses_cache(index, self.capacity, self.head) {
                    values.extend(cache.read(element_count));
                } else {
                    let successor = (index + 1) % self.capacity;
                    match source.layout {
                        Layout::StackCompressed { stack_depth } => {
                            let inner_element_count = element_count / stack_depth;
                            values.extend(linkage::read_stack_compressed_row(
                                storage,
                                successor,
                                stack_depth,
                                inner_element_count,
                            ));
                        }
                        Layout::Plain | Layout::NextOfSource => {
                            values.extend(storage.read_at(successor * element_count, element_count));
                        }
                    }
                }
            }
            batch.fields.insert(next_name, BatchField { shape: source.spec.shape.clone(), values });
        }

        Ok(batch)
    }
}

/// A fixed-capacity, columnar replay buffer.
///
/// Construct with [`ReplayBuffer::new`], declaring each field's shape and
/// dtype, and optionally naming one field as `next_of` (its successor is
/// synthesized rather than stored) and/or `stack_compress` (its column is
/// stored as a single rolling buffer of overlapping frame stacks).
pub struct ReplayBuffer {
    core: Core,
}

impl ReplayBuffer {
    pub fn new(
        capacity: usize,
        fields: Vec<(&str, FieldSpec)>,
        next_of: Option<&str>,
        stack_compress: Option<&str>,
    ) -> Result<Self, ReplayBufferError> {
        Ok(Self { core: Core::new(capacity, fields, next_of, stack_compress)? })
    }

    /// Appends `n` records, where `n` is inferred from each field's
    /// supplied length divided by its element count. Every declared field,
    /// plus `next_X` if `next_of` is configured, must be present.
    pub fn add(&mut self, fields: &[(&str, &[f64])]) -> Result<usize, ReplayBufferError> {
        self.core.add(fields)
    }

    /// Draws `batch_size` physical indexes uniformly at random, with
    /// replacement, and encodes them.
    pub fn sample(&mut self, batch_size: usize) -> Result<Batch, ReplayBufferError> {
        let mut rng = rand::thread_rng();
        let indexes = sampler::sample_uniform(self.core.get_stored_size(), batch_size, &mut rng)?;
        let batch = self.core.encode_sample(&indexes)?;
        self.core.record_sample(batch_size);
        Ok(batch)
    }

    /// Gathers the given physical indexes into a [`Batch`], without
    /// drawing any new ones.
    pub fn encode_sample(&self, indexes: &[usize]) -> Result<Batch, ReplayBufferError> {
        self.core.encode_sample(indexes)
    }

    /// The physical index the next `add` call will write to first.
    pub fn get_next_index(&self) -> usize {
        self.core.get_next_index()
    }

    /// The number of valid records currently stored (`<= capacity`).
    pub fn get_stored_size(&self) -> usize {
        self.core.get_stored_size()
    }

    /// Resets the buffer to empty, zeroing every column.
    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// A snapshot of this buffer's lifetime usage counters.
    pub fn stats(&self) -> Stats {
        self.core.stats()
    }
}
