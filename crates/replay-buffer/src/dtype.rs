//! Column element types and their coercion rules.

use std::fmt;

/// The element type of a column.
///
/// Defaults to [`Dtype::F32`] when a field descriptor omits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// 32-bit IEEE-754 float.
    F32,
    /// 64-bit IEEE-754 float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// Boolean, stored packed as a single byte per element.
    Bool,
}

impl Default for Dtype {
    fn default() -> Self {
        Self::F32
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::Bool => "bool",
        };
        f.write_str(s)
    }
}

impl Dtype {
    /// Returns `true` if `value` can be coerced to this dtype without loss.
    ///
    /// Narrowing a non-integral float to an integer dtype, or a negative
    /// value to an unsigned dtype, is a loss of information and is rejected.
    pub(crate) fn accepts(self, value: f64) -> bool {
        match self {
            Self::F32 => value.is_finite() && (value as f32) as f64 == value,
            Self::F64 => true,
            Self::I32 => is_exact_integer(value) && value >= i32::MIN as f64 && value <= i32::MAX as f64,
            Self::I64 => is_exact_integer(value) && value >= i64::MIN as f64 && value <= i64::MAX as f64,
            Self::U8 => is_exact_integer(value) && value >= 0.0 && value <= u8::MAX as f64,
            Self::U16 => is_exact_integer(value) && value >= 0.0 && value <= u16::MAX as f64,
            Self::Bool => value == 0.0 || value == 1.0,
        }
    }
}

fn is_exact_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_f32() {
        assert_eq!(Dtype::default(), Dtype::F32);
    }

    #[test]
    fn f32_rejects_unrepresentable_precision() {
        assert!(Dtype::F32.accepts(1.5));
        assert!(!Dtype::F32.accepts(f64::from(f32::MAX) * 2.0));
    }

    #[test]
    fn integer_dtypes_reject_fractions() {
        assert!(!Dtype::I32.accepts(1.5));
        assert!(Dtype::I32.accepts(3.0));
    }

    #[test]
    fn unsigned_dtypes_reject_negatives() {
        assert!(!Dtype::U8.accepts(-1.0));
        assert!(Dtype::U8.accepts(255.0));
        assert!(!Dtype::U8.accepts(256.0));
    }

    #[test]
    fn bool_only_accepts_zero_or_one() {
        assert!(Dtype::Bool.accepts(0.0));
        assert!(Dtype::Bool.accepts(1.0));
        assert!(!Dtype::Bool.accepts(2.0));
    }
}
