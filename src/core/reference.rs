//! References: a literal constant or a link to a variable.
//!
//! Every reference has an explicit `Unbound` state. An unbound reference is
//! not an error; it resolves to the kind's zero value (`false`, `0`, or the
//! zero vector). A bound reference whose variable has an incompatible kind
//! is a configuration error and fails with
//! [`EngineError::KindMismatch`](crate::error::EngineError::KindMismatch).

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::store::VariableStore;
use super::value::{Number, VariableKind, VectorShape, VectorValue};
use super::variable::VariableId;

/// Reference to a boolean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BoolReference {
    /// Not linked to anything; resolves to `false`.
    #[default]
    Unbound,
    /// A constant.
    Literal(bool),
    /// A bool variable.
    Bound(VariableId),
}

impl BoolReference {
    /// Resolve to the current value.
    pub fn resolve(&self, store: &VariableStore) -> Result<bool> {
        match self {
            Self::Unbound => Ok(false),
            Self::Literal(v) => Ok(*v),
            Self::Bound(id) => {
                let variable = store.get(*id)?;
                variable
                    .value()
                    .as_bool()
                    .ok_or_else(|| variable.mismatch(&VariableKind::Bool))
            }
        }
    }

    /// The bound variable, if any.
    #[must_use]
    pub fn variable(&self) -> Option<VariableId> {
        match self {
            Self::Bound(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<bool> for BoolReference {
    fn from(v: bool) -> Self {
        Self::Literal(v)
    }
}

impl From<VariableId> for BoolReference {
    fn from(id: VariableId) -> Self {
        Self::Bound(id)
    }
}

/// Reference to a number of any precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NumberReference {
    /// Not linked to anything; resolves to `Number::Int(0)`.
    #[default]
    Unbound,
    /// A constant.
    Literal(Number),
    /// An int, float or double variable.
    Bound(VariableId),
}

impl NumberReference {
    /// Resolve to the current number, keeping its precision.
    ///
    /// Unbound references resolve to an integer zero so they never raise
    /// the precision of an operation.
    pub fn resolve(&self, store: &VariableStore) -> Result<Number> {
        match self {
            Self::Unbound => Ok(Number::Int(0)),
            Self::Literal(n) => Ok(*n),
            Self::Bound(id) => {
                let variable = store.get(*id)?;
                variable
                    .value()
                    .as_number()
                    .ok_or_else(|| variable.mismatch(&"number"))
            }
        }
    }

    /// Resolve and widen to f64.
    pub fn value_as_f64(&self, store: &VariableStore) -> Result<f64> {
        self.resolve(store).map(Number::as_f64)
    }

    /// The bound variable, if any.
    #[must_use]
    pub fn variable(&self) -> Option<VariableId> {
        match self {
            Self::Bound(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Number> for NumberReference {
    fn from(n: Number) -> Self {
        Self::Literal(n)
    }
}

impl From<i32> for NumberReference {
    fn from(v: i32) -> Self {
        Self::Literal(Number::Int(v))
    }
}

impl From<f32> for NumberReference {
    fn from(v: f32) -> Self {
        Self::Literal(Number::Float(v))
    }
}

impl From<f64> for NumberReference {
    fn from(v: f64) -> Self {
        Self::Literal(Number::Double(v))
    }
}

impl From<VariableId> for NumberReference {
    fn from(id: VariableId) -> Self {
        Self::Bound(id)
    }
}

/// Reference to a vector of any shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum VectorReference {
    /// Not linked to anything; resolves to the 2D integer zero vector.
    #[default]
    Unbound,
    /// A constant.
    Literal(VectorValue),
    /// A vector variable.
    Bound(VariableId),
}

impl VectorReference {
    /// Resolve to the current vector in its native shape.
    pub fn resolve(&self, store: &VariableStore) -> Result<VectorValue> {
        match self {
            Self::Unbound => Ok(VectorValue::zero(VectorShape::new(2, true))),
            Self::Literal(v) => Ok(*v),
            Self::Bound(id) => {
                let variable = store.get(*id)?;
                variable
                    .value()
                    .as_vector()
                    .ok_or_else(|| variable.mismatch(&"vector"))
            }
        }
    }

    /// Resolve and project onto the plane (first two components).
    pub fn planar(&self, store: &VariableStore) -> Result<[f32; 2]> {
        self.resolve(store).map(|v| v.planar())
    }

    /// The bound variable, if any.
    #[must_use]
    pub fn variable(&self) -> Option<VariableId> {
        match self {
            Self::Bound(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<VectorValue> for VectorReference {
    fn from(v: VectorValue) -> Self {
        Self::Literal(v)
    }
}

impl From<VariableId> for VectorReference {
    fn from(id: VariableId) -> Self {
        Self::Bound(id)
    }
}
