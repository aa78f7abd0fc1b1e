//! Precision and shape rules shared by numeric and vector operations.
//!
//! ## Numbers
//!
//! Two operands compute at the higher of their precisions
//! (`Int32 < Float32 < Float64`). The arithmetic itself runs in f64 and the
//! result is then quantized to that merged precision. Only afterwards is it
//! narrowed to the target variable's kind, using the operation's
//! [`Rounding`] when the target is an integer.
//!
//! ## Vectors
//!
//! The merged shape has the longer operand's length and integer components
//! only if both operands are integer vectors.

use serde::{Deserialize, Serialize};

use crate::core::{Number, NumberKind, VectorShape};

/// The precision two operands compute at.
#[must_use]
pub fn merge_precision(a: NumberKind, b: NumberKind) -> NumberKind {
    a.max(b)
}

/// The shape two vector operands compute at.
#[must_use]
pub fn merge_vector_shape(a: VectorShape, b: VectorShape) -> VectorShape {
    VectorShape::new(a.len.max(b.len), a.integer && b.integer)
}

/// How a fractional result becomes an integer.
///
/// Every variant saturates at the i32 bounds; NaN becomes 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Nearest integer, halves away from zero (`2.5 -> 3`, `-2.5 -> -3`).
    #[default]
    RoundToInt,
    /// Toward negative infinity.
    FloorToInt,
    /// Toward positive infinity.
    CeilToInt,
}

impl Rounding {
    /// Round to an i32.
    #[must_use]
    pub fn apply(self, value: f64) -> i32 {
        let rounded = match self {
            Self::RoundToInt => value.round(),
            Self::FloorToInt => value.floor(),
            Self::CeilToInt => value.ceil(),
        };
        rounded as i32
    }
}

/// Narrow an f64 result to the target's precision.
#[must_use]
pub fn narrow(value: f64, target: NumberKind, rounding: Rounding) -> Number {
    match target {
        NumberKind::Int32 => Number::Int(rounding.apply(value)),
        NumberKind::Float32 => Number::Float(value as f32),
        NumberKind::Float64 => Number::Double(value),
    }
}

/// Quantize an f64 to what the given precision can hold.
///
/// Integer precision truncates toward zero, like integer division.
#[must_use]
pub fn quantize(value: f64, precision: NumberKind) -> f64 {
    match precision {
        NumberKind::Int32 => f64::from(value.trunc() as i32),
        NumberKind::Float32 => f64::from(value as f32),
        NumberKind::Float64 => value,
    }
}

/// Binary arithmetic used by numeric and vector operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arithmetic {
    /// Copy the first operand.
    #[default]
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Remainder with the sign of the dividend.
    Modulo,
    /// First operand raised to the second.
    Power,
    Min,
    Max,
}

impl Arithmetic {
    /// Compute `a op b` at `precision`.
    ///
    /// Returns `None` for division or modulo by zero at integer precision;
    /// float precisions follow IEEE-754 instead.
    #[must_use]
    pub fn apply(self, a: f64, b: f64, precision: NumberKind) -> Option<f64> {
        if precision.is_integer() && matches!(self, Self::Divide | Self::Modulo) && b == 0.0 {
            return None;
        }

        let raw = match self {
            Self::Set => a,
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
            Self::Modulo => a % b,
            Self::Power => a.powf(b),
            Self::Min => a.min(b),
            Self::Max => a.max(b),
        };
        Some(quantize(raw, precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_precision_table() {
        use NumberKind::*;
        assert_eq!(merge_precision(Int32, Int32), Int32);
        assert_eq!(merge_precision(Int32, Float32), Float32);
        assert_eq!(merge_precision(Float32, Int32), Float32);
        assert_eq!(merge_precision(Float32, Float32), Float32);
        assert_eq!(merge_precision(Int32, Float64), Float64);
        assert_eq!(merge_precision(Float64, Float32), Float64);
    }

    #[test]
    fn test_merge_vector_shape() {
        let int2 = VectorShape::new(2, true);
        let int4 = VectorShape::new(4, true);
        let float3 = VectorShape::new(3, false);

        assert_eq!(merge_vector_shape(int2, int4), VectorShape::new(4, true));
        assert_eq!(merge_vector_shape(int2, float3), VectorShape::new(3, false));
        assert_eq!(merge_vector_shape(float3, int4), VectorShape::new(4, false));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(Rounding::FloorToInt.apply(3.7), 3);
        assert_eq!(Rounding::CeilToInt.apply(3.2), 4);
        assert_eq!(Rounding::RoundToInt.apply(3.5), 4);
        assert_eq!(Rounding::RoundToInt.apply(-3.5), -4);
        assert_eq!(Rounding::RoundToInt.apply(2.5), 3);
        assert_eq!(Rounding::FloorToInt.apply(-0.5), -1);
    }

    #[test]
    fn test_rounding_saturates() {
        assert_eq!(Rounding::RoundToInt.apply(1e12), i32::MAX);
        assert_eq!(Rounding::RoundToInt.apply(-1e12), i32::MIN);
        assert_eq!(Rounding::RoundToInt.apply(f64::NAN), 0);
    }

    #[test]
    fn test_narrow() {
        assert_eq!(narrow(2.6, NumberKind::Int32, Rounding::FloorToInt), Number::Int(2));
        assert_eq!(narrow(0.1, NumberKind::Float32, Rounding::RoundToInt), Number::Float(0.1));
        assert_eq!(narrow(0.1, NumberKind::Float64, Rounding::RoundToInt), Number::Double(0.1));
    }

    #[test]
    fn test_integer_precision_truncates() {
        assert_eq!(Arithmetic::Divide.apply(7.0, 2.0, NumberKind::Int32), Some(3.0));
        assert_eq!(Arithmetic::Divide.apply(-7.0, 2.0, NumberKind::Int32), Some(-3.0));
        assert_eq!(Arithmetic::Divide.apply(7.0, 2.0, NumberKind::Float32), Some(3.5));
    }

    #[test]
    fn test_float32_precision_rounds_through_f32() {
        let result = Arithmetic::Add.apply(0.1, 0.2, NumberKind::Float32).unwrap();
        assert_eq!(result, f64::from(0.3f32));
        let result = Arithmetic::Add.apply(0.1, 0.2, NumberKind::Float64).unwrap();
        assert_eq!(result, 0.1 + 0.2);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Arithmetic::Divide.apply(1.0, 0.0, NumberKind::Int32), None);
        assert_eq!(Arithmetic::Modulo.apply(1.0, 0.0, NumberKind::Int32), None);
        assert_eq!(
            Arithmetic::Divide.apply(1.0, 0.0, NumberKind::Float64),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_operators() {
        let p = NumberKind::Float64;
        assert_eq!(Arithmetic::Set.apply(4.0, 9.0, p), Some(4.0));
        assert_eq!(Arithmetic::Subtract.apply(4.0, 9.0, p), Some(-5.0));
        assert_eq!(Arithmetic::Multiply.apply(4.0, 9.0, p), Some(36.0));
        assert_eq!(Arithmetic::Modulo.apply(-7.0, 3.0, p), Some(-1.0));
        assert_eq!(Arithmetic::Power.apply(2.0, 10.0, p), Some(1024.0));
        assert_eq!(Arithmetic::Min.apply(4.0, 9.0, p), Some(4.0));
        assert_eq!(Arithmetic::Max.apply(4.0, 9.0, p), Some(9.0));
    }
}
