//! The closed operation family and the shared write path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    BoolReference, NumberKind, Value, VariableId, VariableKind, VariableStore, VectorShape,
};
use crate::error::{EngineError, Result};
use crate::script::ExpressionEvaluator;

use super::{BoolOperation, NumberOperation, ScriptedNumberOperation, VectorOperation};

/// What an executed operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Execution {
    /// The variable written.
    pub target: VariableId,
    /// Whether its change notification fired.
    pub raised: bool,
}

/// Any operation.
///
/// Variants are listed in the order a rule runs its families.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Bool(BoolOperation),
    Number(NumberOperation),
    ScriptedNumber(ScriptedNumberOperation),
    Vector(VectorOperation),
}

impl Operation {
    /// The variable this operation writes.
    #[must_use]
    pub fn target(&self) -> VariableId {
        match self {
            Self::Bool(op) => op.target,
            Self::Number(op) => op.target,
            Self::ScriptedNumber(op) => op.target,
            Self::Vector(op) => op.target,
        }
    }

    /// Short family name for diagnostics.
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::ScriptedNumber(_) => "scripted number",
            Self::Vector(_) => "vector",
        }
    }

    #[must_use]
    pub fn raise_event(&self) -> &BoolReference {
        match self {
            Self::Bool(op) => &op.raise_event,
            Self::Number(op) => &op.raise_event,
            Self::ScriptedNumber(op) => &op.raise_event,
            Self::Vector(op) => &op.raise_event,
        }
    }

    pub fn raise_event_mut(&mut self) -> &mut BoolReference {
        match self {
            Self::Bool(op) => &mut op.raise_event,
            Self::Number(op) => &mut op.raise_event,
            Self::ScriptedNumber(op) => &mut op.raise_event,
            Self::Vector(op) => &mut op.raise_event,
        }
    }

    /// The expression this operation evaluates, if any.
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::ScriptedNumber(op) => Some(&op.expression),
            _ => None,
        }
    }

    /// Check the target and every reference against a store without
    /// executing. Scripted expressions go through
    /// [`ExpressionEvaluator::validate`].
    pub fn validate(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<()> {
        match self {
            Self::Bool(op) => {
                store.get(op.target)?.expect_kind(VariableKind::Bool)?;
                op.a.resolve(store)?;
                op.b.resolve(store)?;
            }
            Self::Number(op) => {
                number_target(store, op.target)?;
                op.a.resolve(store)?;
                op.b.resolve(store)?;
            }
            Self::ScriptedNumber(op) => {
                number_target(store, op.target)?;
                op.bindings(store)?;
                evaluator
                    .validate(&op.expression)
                    .map_err(|e| EngineError::script(&op.expression, e))?;
            }
            Self::Vector(op) => {
                vector_target(store, op.target)?;
                op.a.resolve(store)?;
                op.b.resolve(store)?;
            }
        }
        self.raise_event().resolve(store)?;
        Ok(())
    }

    /// Compute, write, then raise if the raise flag resolves true.
    ///
    /// Inputs and the raise flag are all read before the target is written,
    /// so a failing operation leaves the store exactly as it found it.
    pub fn execute(
        &self,
        store: &mut VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Execution> {
        match self {
            Self::Bool(op) => op.execute(store),
            Self::Number(op) => op.execute(store),
            Self::ScriptedNumber(op) => op.execute(store, evaluator),
            Self::Vector(op) => op.execute(store),
        }
    }
}

impl From<BoolOperation> for Operation {
    fn from(op: BoolOperation) -> Self {
        Self::Bool(op)
    }
}

impl From<NumberOperation> for Operation {
    fn from(op: NumberOperation) -> Self {
        Self::Number(op)
    }
}

impl From<ScriptedNumberOperation> for Operation {
    fn from(op: ScriptedNumberOperation) -> Self {
        Self::ScriptedNumber(op)
    }
}

impl From<VectorOperation> for Operation {
    fn from(op: VectorOperation) -> Self {
        Self::Vector(op)
    }
}

/// Write `value` to `target` and raise it when `raise` is set.
pub(crate) fn commit(
    store: &mut VariableStore,
    target: VariableId,
    value: Value,
    raise: bool,
) -> Result<Execution> {
    store.set(target, value)?;
    if raise {
        store.raise(target)?;
    }

    let written = store.get(target)?;
    debug!(
        target: "operations",
        variable = %written,
        raised = raise,
        "operation executed"
    );
    Ok(Execution {
        target,
        raised: raise,
    })
}

/// The name and precision of a numeric target.
pub(crate) fn number_target(store: &VariableStore, id: VariableId) -> Result<(&str, NumberKind)> {
    let variable = store.get(id)?;
    match variable.kind() {
        VariableKind::Number(kind) => Ok((variable.name(), kind)),
        _ => Err(variable.mismatch(&"number")),
    }
}

/// The name and shape of a vector target.
pub(crate) fn vector_target(store: &VariableStore, id: VariableId) -> Result<(&str, VectorShape)> {
    let variable = store.get(id)?;
    match variable.kind() {
        VariableKind::Vector(shape) => Ok((variable.name(), shape)),
        _ => Err(variable.mismatch(&"vector")),
    }
}
