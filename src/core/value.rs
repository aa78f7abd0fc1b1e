//! Value types held by variables.
//!
//! ## Kinds
//!
//! - `Bool`: flags
//! - `Number`: `Int` (i32), `Float` (f32) or `Double` (f64)
//! - `Vector`: 2, 3 or 4 components of i32 or f32
//!
//! A variable's kind is fixed when it is declared. Numbers of different
//! precisions can still be combined by operations; see
//! [`merge_precision`](crate::operations::merge_precision).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision of a numeric value.
///
/// The derived ordering is the precision order `Int32 < Float32 < Float64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumberKind {
    /// 32-bit signed integer.
    Int32,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
}

impl NumberKind {
    /// Whether values of this kind are integers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int32)
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "int"),
            Self::Float32 => write!(f, "float"),
            Self::Float64 => write!(f, "double"),
        }
    }
}

/// A scalar number of one of the supported precisions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Number {
    /// Integer value.
    Int(i32),
    /// Single precision value.
    Float(f32),
    /// Double precision value.
    Double(f64),
}

impl Number {
    /// Zero of the given kind.
    #[must_use]
    pub const fn zero(kind: NumberKind) -> Self {
        match kind {
            NumberKind::Int32 => Self::Int(0),
            NumberKind::Float32 => Self::Float(0.0),
            NumberKind::Float64 => Self::Double(0.0),
        }
    }

    /// The precision of this number.
    #[must_use]
    pub const fn kind(self) -> NumberKind {
        match self {
            Self::Int(_) => NumberKind::Int32,
            Self::Float(_) => NumberKind::Float32,
            Self::Double(_) => NumberKind::Float64,
        }
    }

    /// Widen to f64. Exact for every variant.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => f64::from(v),
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Dimension and component type of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VectorShape {
    /// Number of components (2, 3 or 4).
    pub len: usize,
    /// Whether components are integers.
    pub integer: bool,
}

impl VectorShape {
    /// Create a shape. Lengths are clamped into `2..=4`.
    #[must_use]
    pub fn new(len: usize, integer: bool) -> Self {
        Self {
            len: len.clamp(2, 4),
            integer,
        }
    }
}

impl fmt::Display for VectorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.integer {
            write!(f, "vector{}int", self.len)
        } else {
            write!(f, "vector{}", self.len)
        }
    }
}

/// A 2, 3 or 4 component vector of ints or floats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VectorValue {
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
}

impl VectorValue {
    /// The zero vector of a shape.
    #[must_use]
    pub fn zero(shape: VectorShape) -> Self {
        Self::from_components(shape, [0.0; 4])
    }

    /// The shape of this vector.
    #[must_use]
    pub fn shape(&self) -> VectorShape {
        match self {
            Self::Int2(_) => VectorShape::new(2, true),
            Self::Int3(_) => VectorShape::new(3, true),
            Self::Int4(_) => VectorShape::new(4, true),
            Self::Float2(_) => VectorShape::new(2, false),
            Self::Float3(_) => VectorShape::new(3, false),
            Self::Float4(_) => VectorShape::new(4, false),
        }
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape().len
    }

    /// Always false; vectors have at least two components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Components widened to f64, zero-padded to four.
    #[must_use]
    pub fn components(&self) -> [f64; 4] {
        let mut out = [0.0; 4];
        match self {
            Self::Int2(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
            Self::Int3(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
            Self::Int4(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
            Self::Float2(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
            Self::Float3(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
            Self::Float4(c) => widen_into(&mut out, c.iter().map(|v| f64::from(*v))),
        }
        out
    }

    /// Build a vector of `shape` from f64 components.
    ///
    /// Integer shapes truncate toward zero and saturate; callers that need
    /// a rounding policy apply it before calling this.
    #[must_use]
    pub fn from_components(shape: VectorShape, c: [f64; 4]) -> Self {
        let i = |n: usize| c[n] as i32;
        let f = |n: usize| c[n] as f32;
        match (shape.len, shape.integer) {
            (2, true) => Self::Int2([i(0), i(1)]),
            (3, true) => Self::Int3([i(0), i(1), i(2)]),
            (4, true) => Self::Int4([i(0), i(1), i(2), i(3)]),
            (2, false) => Self::Float2([f(0), f(1)]),
            (3, false) => Self::Float3([f(0), f(1), f(2)]),
            _ if shape.integer => Self::Int4([i(0), i(1), i(2), i(3)]),
            _ => Self::Float4([f(0), f(1), f(2), f(3)]),
        }
    }

    /// 2D projection: drops trailing components.
    #[must_use]
    pub fn planar(&self) -> [f32; 2] {
        let c = self.components();
        [c[0] as f32, c[1] as f32]
    }
}

fn widen_into(out: &mut [f64; 4], values: impl Iterator<Item = f64>) {
    for (slot, v) in out.iter_mut().zip(values) {
        *slot = v;
    }
}

impl fmt::Display for VectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.components();
        write!(f, "(")?;
        for (n, v) in c.iter().take(self.len()).enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            if self.shape().integer {
                write!(f, "{}", *v as i64)?;
            } else {
                write!(f, "{v}")?;
            }
        }
        write!(f, ")")
    }
}

/// The kind of a variable. Fixed at declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Bool,
    Number(NumberKind),
    Vector(VectorShape),
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Number(kind) => write!(f, "{kind}"),
            Self::Vector(shape) => write!(f, "{shape}"),
        }
    }
}

/// A variable's value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Number(Number),
    Vector(VectorValue),
}

impl Value {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        match self {
            Self::Bool(_) => VariableKind::Bool,
            Self::Number(n) => VariableKind::Number(n.kind()),
            Self::Vector(v) => VariableKind::Vector(v.shape()),
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as number if this is a Number value.
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as vector if this is a Vector value.
    #[must_use]
    pub fn as_vector(&self) -> Option<VectorValue> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(Number::Int(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Number(Number::Float(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(Number::Double(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<VectorValue> for Value {
    fn from(v: VectorValue) -> Self {
        Self::Vector(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Vector(v) => write!(f, "{v}"),
        }
    }
}
