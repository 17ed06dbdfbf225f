//! Environment-dict compiler: turns a user-declared field list into the
//! physical column layout.

use crate::dtype::Dtype;
use crate::error::ReplayBufferError;

/// Descriptor for one field of the schema.
///
/// `shape` is the field's shape without the batch dimension; an empty shape
/// denotes a scalar field. `dtype` defaults to [`Dtype::F32`] via
/// [`FieldSpec::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Shape of one record of this field (no leading batch dimension).
    pub shape: Vec<usize>,
    /// Element dtype.
    pub dtype: Dtype,
}

impl FieldSpec {
    /// A scalar field of the given dtype.
    pub fn scalar(dtype: Dtype) -> Self {
        Self { shape: Vec::new(), dtype }
    }

    /// A field with the given shape, defaulting to [`Dtype::F32`].
    pub fn shaped(shape: impl Into<Vec<usize>>) -> Self {
        Self { shape: shape.into(), dtype: Dtype::default() }
    }

    /// A field with the given shape and dtype.
    pub fn shaped_with_dtype(shape: impl Into<Vec<usize>>, dtype: Dtype) -> Self {
        Self { shape: shape.into(), dtype }
    }

    /// `prod(shape)`, or `1` for a scalar field.
    pub fn element_count(&self) -> usize {
        let product: usize = self.shape.iter().product();
        if self.shape.is_empty() {
            1
        } else {
            product
        }
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::scalar(Dtype::default())
    }
}

/// How a column backing a field is laid out relative to `next_of`/
/// `stack_compress` linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// An ordinary column of length `capacity`.
    Plain,
    /// The field that `next_of` aliases: no dedicated `next_X` column is
    /// allocated; `next_X` is synthesized from this column plus the
    /// boundary cache.
    NextOfSource,
    /// The field that `stack_compress` applies to: the column has length
    /// `capacity + stack_depth - 1` and reads return a window.
    StackCompressed { stack_depth: usize },
}

/// One physical field after schema compilation.
#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub name: String,
    pub spec: FieldSpec,
    pub layout: Layout,
}

/// The immutable, compiled schema: an ordered list of fields plus the
/// resolved `next_of`/`stack_compress` linkage, if any.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) fields: Vec<CompiledField>,
    pub(crate) next_of: Option<String>,
    pub(crate) stack_compress: Option<String>,
}

impl Schema {
    /// Compiles a user-declared field list into a [`Schema`].
    ///
    /// `next_of` names a field `X` whose successor `next_X` is synthesized
    /// instead of stored; the caller must still supply `next_X` on `add`.
    /// `stack_compress` names a field `X` whose column is stored as a
    /// single rolling buffer of overlapping frame stacks.
    pub fn compile(
        fields: &[(&str, FieldSpec)],
        next_of: Option<&str>,
        stack_compress: Option<&str>,
    ) -> Result<Schema, ReplayBufferError> {
        let mut compiled = Vec::with_capacity(fields.len());

        for (name, spec) in fields {
            let layout = if Some(*name) == next_of && Some(*name) == stack_compress {
                let stack_depth = *spec.shape.first().unwrap_or(&1);
                Layout::StackCompressed { stack_depth }
            } else if Some(*name) == next_of {
                Layout::NextOfSource
            } else if Some(*name) == stack_compress {
                let stack_depth = *spec.shape.first().unwrap_or(&1);
                Layout::StackCompressed { stack_depth }
            } else {
                Layout::Plain
            };

            compiled.push(CompiledField { name: (*name).to_string(), spec: spec.clone(), layout });
        }

        Ok(Schema {
            fields: compiled,
            next_of: next_of.map(str::to_string),
            stack_compress: stack_compress.map(str::to_string),
        })
    }

    /// Returns the compiled field matching `name`, if any.
    pub(crate) fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name of the `next_X` input field, if `next_of` is configured.
    pub(crate) fn next_field_name(&self) -> Option<String> {
        self.next_of.as_ref().map(|x| format!("next_{x}"))
    }

    /// The compiled field that `next_of` aliases, if configured.
    pub(crate) fn next_of_source(&self) -> Option<&CompiledField> {
        self.next_of.as_deref().and_then(|x| self.field(x))
    }

    /// Every input field name a caller must supply to `add`: the declared
    /// schema fields, plus `next_X` in place of a dedicated column when
    /// `next_of = X` is configured.
    pub(crate) fn input_field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        if let Some(next_name) = self.next_field_name() {
            names.push(next_name);
        }
        names
    }
}
