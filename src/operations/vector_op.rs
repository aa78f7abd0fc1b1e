//! Component-wise vector operations.

use serde::{Deserialize, Serialize};

use crate::core::{
    BoolReference, NumberKind, VariableId, VariableStore, VectorReference, VectorShape,
    VectorValue,
};
use crate::error::{EngineError, Result};

use super::precision::{merge_vector_shape, Arithmetic, Rounding};
use super::{commit, vector_target, Execution};

/// `target = a <op> b`, component by component.
///
/// Operands are zero-padded to the merged shape. Integer shapes compute at
/// int precision and float shapes at float precision. The result is then
/// fitted to the target's shape: surplus components are dropped and
/// integer targets apply [`Rounding`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorOperation {
    /// The vector variable written.
    pub target: VariableId,
    pub operator: Arithmetic,
    pub a: VectorReference,
    pub b: VectorReference,
    /// Applied when the target is an integer vector.
    #[serde(default)]
    pub rounding: Rounding,
    /// Raise the target's change notification after writing.
    #[serde(default)]
    pub raise_event: BoolReference,
}

impl VectorOperation {
    /// Create an operation that rounds to nearest and raises after executing.
    pub fn new(
        target: VariableId,
        operator: Arithmetic,
        a: impl Into<VectorReference>,
        b: impl Into<VectorReference>,
    ) -> Self {
        Self {
            target,
            operator,
            a: a.into(),
            b: b.into(),
            rounding: Rounding::RoundToInt,
            raise_event: BoolReference::Literal(true),
        }
    }

    /// Set the rounding policy (builder pattern).
    #[must_use]
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Set the raise flag (builder pattern).
    #[must_use]
    pub fn with_raise_event(mut self, raise_event: impl Into<BoolReference>) -> Self {
        self.raise_event = raise_event.into();
        self
    }

    /// Compute the new value without writing it.
    pub fn compute(&self, store: &VariableStore) -> Result<VectorValue> {
        let (name, target_shape) = vector_target(store, self.target)?;

        let a = self.a.resolve(store)?;
        let b = self.b.resolve(store)?;
        let merged = merge_vector_shape(a.shape(), b.shape());
        let precision = if merged.integer {
            NumberKind::Int32
        } else {
            NumberKind::Float32
        };

        let (ca, cb) = (a.components(), b.components());
        let mut out = [0.0; 4];
        for (i, slot) in out.iter_mut().enumerate().take(merged.len) {
            *slot = self
                .operator
                .apply(ca[i], cb[i], precision)
                .ok_or_else(|| EngineError::DivisionByZero {
                    target: name.to_string(),
                })?;
        }

        Ok(fit(out, target_shape, self.rounding))
    }

    /// Write the result to the target and raise it if the flag is set.
    pub fn execute(&self, store: &mut VariableStore) -> Result<Execution> {
        let value = self.compute(store)?;
        let raise = self.raise_event.resolve(store)?;
        commit(store, self.target, value.into(), raise)
    }
}

/// Fit computed components to the target's shape.
fn fit(mut components: [f64; 4], shape: VectorShape, rounding: Rounding) -> VectorValue {
    for (i, c) in components.iter_mut().enumerate() {
        if i >= shape.len {
            *c = 0.0;
        } else if shape.integer {
            *c = f64::from(rounding.apply(*c));
        }
    }
    VectorValue::from_components(shape, components)
}
