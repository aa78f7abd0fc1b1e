//! Numeric operations computed by an expression.

use serde::{Deserialize, Serialize};

use crate::core::{BoolReference, Number, NumberReference, VariableId, VariableStore};
use crate::error::{EngineError, Result};
use crate::script::{Bindings, ExpressionEvaluator, ScriptValue};

use super::precision::{narrow, Rounding};
use super::{commit, number_target, Execution};

/// `target = f(nA, nB, nC)` where `f` is an expression.
///
/// `nA` is the target's current value; `nB` and `nC` come from the two
/// auxiliary references. The expression must return a number. Its result
/// is narrowed to the target's kind with the same rounding pipeline as
/// [`NumberOperation`](super::NumberOperation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedNumberOperation {
    /// The int, float or double variable written; bound as `nA`.
    pub target: VariableId,
    pub expression: String,
    /// Bound as `nB`.
    #[serde(default)]
    pub number_b: NumberReference,
    /// Bound as `nC`.
    #[serde(default)]
    pub number_c: NumberReference,
    #[serde(default)]
    pub rounding: Rounding,
    /// Raise the target's change notification after writing.
    #[serde(default)]
    pub raise_event: BoolReference,
}

impl ScriptedNumberOperation {
    /// Create an operation with unbound `nB`/`nC` that raises after executing.
    pub fn new(target: VariableId, expression: impl Into<String>) -> Self {
        Self {
            target,
            expression: expression.into(),
            number_b: NumberReference::Unbound,
            number_c: NumberReference::Unbound,
            rounding: Rounding::RoundToInt,
            raise_event: BoolReference::Literal(true),
        }
    }

    /// Set the `nB` and `nC` inputs (builder pattern).
    #[must_use]
    pub fn with_numbers(
        mut self,
        b: impl Into<NumberReference>,
        c: impl Into<NumberReference>,
    ) -> Self {
        self.number_b = b.into();
        self.number_c = c.into();
        self
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

    /// Build the evaluator environment from current values.
    pub fn bindings(&self, store: &VariableStore) -> Result<Bindings> {
        let current = NumberReference::Bound(self.target).value_as_f64(store)?;
        Ok(Bindings::new()
            .with("nA", current)
            .with("nB", self.number_b.value_as_f64(store)?)
            .with("nC", self.number_c.value_as_f64(store)?))
    }

    /// Compute the new value without writing it.
    pub fn compute(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Number> {
        let (_, target_kind) = number_target(store, self.target)?;
        let bindings = self.bindings(store)?;

        let result = evaluator
            .evaluate(&self.expression, &bindings)
            .map_err(|e| EngineError::script(&self.expression, e))?;

        match result {
            ScriptValue::Number(n) => Ok(narrow(n, target_kind, self.rounding)),
            other => Err(EngineError::NonNumericResult {
                expression: self.expression.clone(),
                found: other.type_name(),
            }),
        }
    }

    /// Write the result to the target and raise it if the flag is set.
    pub fn execute(
        &self,
        store: &mut VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Execution> {
        let value = self.compute(store, evaluator)?;
        let raise = self.raise_event.resolve(store)?;
        commit(store, self.target, value.into(), raise)
    }
}
