//! Boolean operations.

use serde::{Deserialize, Serialize};

use crate::core::{BoolReference, VariableId, VariableKind, VariableStore};
use crate::error::Result;

use super::{commit, Execution};

/// Boolean functions of one or two inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOperator {
    /// Copy `a`.
    #[default]
    Set,
    /// Negate `a`.
    Not,
    And,
    Or,
    Xor,
}

impl BoolOperator {
    /// Apply the function. Unary operators ignore `b`.
    #[must_use]
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::Set => a,
            Self::Not => !a,
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
        }
    }
}

/// `target = a <op> b` over booleans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoolOperation {
    /// The bool variable written.
    pub target: VariableId,
    pub operator: BoolOperator,
    pub a: BoolReference,
    pub b: BoolReference,
    /// Raise the target's change notification after writing.
    #[serde(default)]
    pub raise_event: BoolReference,
}

impl BoolOperation {
    /// Create an operation that raises after executing.
    pub fn new(
        target: VariableId,
        operator: BoolOperator,
        a: impl Into<BoolReference>,
        b: impl Into<BoolReference>,
    ) -> Self {
        Self {
            target,
            operator,
            a: a.into(),
            b: b.into(),
            raise_event: BoolReference::Literal(true),
        }
    }

    /// Set the raise flag (builder pattern).
    #[must_use]
    pub fn with_raise_event(mut self, raise_event: impl Into<BoolReference>) -> Self {
        self.raise_event = raise_event.into();
        self
    }

    /// Compute the new value without writing it.
    pub fn compute(&self, store: &VariableStore) -> Result<bool> {
        store.get(self.target)?.expect_kind(VariableKind::Bool)?;
        Ok(self.operator.apply(self.a.resolve(store)?, self.b.resolve(store)?))
    }

    /// Write the result to the target and raise it if the flag is set.
    pub fn execute(&self, store: &mut VariableStore) -> Result<Execution> {
        let value = self.compute(store)?;
        let raise = self.raise_event.resolve(store)?;
        commit(store, self.target, value.into(), raise)
    }
}
