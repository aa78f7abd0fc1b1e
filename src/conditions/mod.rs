//! Conditions and the gate predicate.
//!
//! A [`Condition`] is a pure predicate over references. A list of
//! conditions forms a gate: it passes when every member passes, checked
//! left to right and stopping at the first failure. An empty or absent
//! list always passes.
//!
//! ## Example Usage
//!
//! ```
//! use reactive_rules::conditions::{Comparison, Condition, PassConditions, ScriptedCondition};
//! use reactive_rules::core::VariableStore;
//! use reactive_rules::script::ScriptEngine;
//!
//! let mut store = VariableStore::new();
//! let gold = store.declare("Gold", 12).unwrap();
//! let unlocked = store.declare("Unlocked", true).unwrap();
//!
//! let gate = vec![
//!     Condition::numbers(gold, Comparison::GreaterOrEqual, 10),
//!     ScriptedCondition::new("bA and nA < 100")
//!         .with_numbers(gold, 0)
//!         .with_bools(unlocked, false)
//!         .into(),
//! ];
//!
//! let engine = ScriptEngine::default();
//! assert!(gate.pass_conditions(&store, &engine).unwrap());
//! ```

mod condition;

pub use condition::{Comparison, Condition, Equality, ScriptedCondition};

use crate::core::VariableStore;
use crate::error::Result;
use crate::script::ExpressionEvaluator;

/// The AND of a list of conditions.
pub trait PassConditions {
    /// True if every condition passes. Stops at the first failing condition
    /// and propagates the first error.
    fn pass_conditions(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool>;
}

impl PassConditions for [Condition] {
    fn pass_conditions(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        for condition in self {
            if !condition.evaluate(store, evaluator)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl PassConditions for Option<&[Condition]> {
    fn pass_conditions(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        match self {
            Some(conditions) => conditions.pass_conditions(store, evaluator),
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::script::{Bindings, EvalError, ScriptEngine, ScriptValue};

    /// Evaluator that counts calls before delegating.
    struct Counting {
        inner: ScriptEngine,
        calls: Cell<usize>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                inner: ScriptEngine::default(),
                calls: Cell::new(0),
            }
        }
    }

    impl ExpressionEvaluator for Counting {
        fn evaluate(&self, expression: &str, bindings: &Bindings) -> std::result::Result<ScriptValue, EvalError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.evaluate(expression, bindings)
        }
    }

    fn literal(expression: &str) -> Condition {
        ScriptedCondition::new(expression).into()
    }

    #[test]
    fn test_empty_and_absent_pass() {
        let store = VariableStore::new();
        let engine = ScriptEngine::default();

        let empty: Vec<Condition> = Vec::new();
        assert!(empty.pass_conditions(&store, &engine).unwrap());

        let absent: Option<&[Condition]> = None;
        assert!(absent.pass_conditions(&store, &engine).unwrap());
    }

    #[test]
    fn test_all_must_pass() {
        let store = VariableStore::new();
        let engine = ScriptEngine::default();

        let passing = vec![literal("true"), literal("1 < 2")];
        assert!(passing.pass_conditions(&store, &engine).unwrap());

        let failing = vec![literal("true"), literal("1 > 2")];
        assert!(!failing.pass_conditions(&store, &engine).unwrap());
        assert!(!Some(failing.as_slice()).pass_conditions(&store, &engine).unwrap());
    }

    #[test]
    fn test_short_circuits_after_first_failure() {
        let store = VariableStore::new();
        let evaluator = Counting::new();

        let gate = vec![literal("true"), literal("false"), literal("true")];
        assert!(!gate.pass_conditions(&store, &evaluator).unwrap());
        assert_eq!(evaluator.calls.get(), 2);
    }

    #[test]
    fn test_error_propagates() {
        let store = VariableStore::new();
        let engine = ScriptEngine::default();

        let gate = vec![literal("true"), literal("nA +")];
        assert!(gate.pass_conditions(&store, &engine).is_err());
    }
}
