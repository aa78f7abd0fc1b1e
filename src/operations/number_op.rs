//! Numeric arithmetic operations.

use serde::{Deserialize, Serialize};

use crate::core::{BoolReference, Number, NumberReference, VariableId, VariableStore};
use crate::error::{EngineError, Result};

use super::precision::{merge_precision, narrow, Arithmetic, Rounding};
use super::{commit, number_target, Execution};

/// `target = a <op> b` over numbers of any precision.
///
/// The operands compute at their merged precision, independent of the
/// target. The target's kind only decides the final narrowing; integer
/// targets use [`Rounding`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumberOperation {
    /// The int, float or double variable written.
    pub target: VariableId,
    pub operator: Arithmetic,
    pub a: NumberReference,
    pub b: NumberReference,
    /// Applied when the target is an integer variable.
    #[serde(default)]
    pub rounding: Rounding,
    /// Raise the target's change notification after writing.
    #[serde(default)]
    pub raise_event: BoolReference,
}

impl NumberOperation {
    /// Create an operation that rounds to nearest and raises after executing.
    pub fn new(
        target: VariableId,
        operator: Arithmetic,
        a: impl Into<NumberReference>,
        b: impl Into<NumberReference>,
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
    pub fn compute(&self, store: &VariableStore) -> Result<Number> {
        let (name, target_kind) = number_target(store, self.target)?;
        let a = self.a.resolve(store)?;
        let b = self.b.resolve(store)?;

        let precision = merge_precision(a.kind(), b.kind());
        let result = self
            .operator
            .apply(a.as_f64(), b.as_f64(), precision)
            .ok_or_else(|| EngineError::DivisionByZero {
                target: name.to_string(),
            })?;

        Ok(narrow(result, target_kind, self.rounding))
    }

    /// Write the result to the target and raise it if the flag is set.
    pub fn execute(&self, store: &mut VariableStore) -> Result<Execution> {
        let value = self.compute(store)?;
        let raise = self.raise_event.resolve(store)?;
        commit(store, self.target, value.into(), raise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_add_literals_into_int() {
        let mut store = VariableStore::new();
        let target = store.declare("Total", 0).unwrap();

        let op = NumberOperation::new(target, Arithmetic::Add, 2, 3);
        op.execute(&mut store).unwrap();

        assert_eq!(store.value(target), Ok(Value::from(5)));
    }

    #[test]
    fn test_int_operands_divide_as_integers() {
        let mut store = VariableStore::new();
        let target = store.declare("Half", 0.0f64).unwrap();

        NumberOperation::new(target, Arithmetic::Divide, 7, 2)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.value(target), Ok(Value::from(3.0f64)));

        NumberOperation::new(target, Arithmetic::Divide, 7, 2.0f32)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.value(target), Ok(Value::from(3.5f64)));
    }

    #[test]
    fn test_rounding_applies_to_int_target() {
        let mut store = VariableStore::new();
        let target = store.declare("Coins", 0).unwrap();

        let cases = [
            (Rounding::RoundToInt, 4),
            (Rounding::FloorToInt, 3),
            (Rounding::CeilToInt, 4),
        ];
        for (rounding, expected) in cases {
            NumberOperation::new(target, Arithmetic::Multiply, 1.75f32, 2)
                .with_rounding(rounding)
                .execute(&mut store)
                .unwrap();
            assert_eq!(store.value(target), Ok(Value::from(expected)), "{rounding:?}");
        }
    }

    #[test]
    fn test_accumulate_into_self() {
        let mut store = VariableStore::new();
        let gold = store.declare("Gold", 10).unwrap();

        let earn = NumberOperation::new(gold, Arithmetic::Add, gold, 5);
        earn.execute(&mut store).unwrap();
        earn.execute(&mut store).unwrap();

        assert_eq!(store.value(gold), Ok(Value::from(20)));
    }

    #[test]
    fn test_unbound_operand_acts_as_int_zero() {
        let mut store = VariableStore::new();
        let x = store.declare("X", 0.0f32).unwrap();
        let y = store.declare("Y", 0.0f32).unwrap();

        NumberOperation::new(x, Arithmetic::Add, 7, NumberReference::Unbound)
            .execute(&mut store)
            .unwrap();
        NumberOperation::new(y, Arithmetic::Add, 7, 0)
            .execute(&mut store)
            .unwrap();

        assert_eq!(store.value(x), store.value(y));
    }

    #[test]
    fn test_integer_division_by_zero_leaves_target() {
        let mut store = VariableStore::new();
        let target = store.declare("Ratio", 9).unwrap();

        let result = NumberOperation::new(target, Arithmetic::Divide, 1, 0).execute(&mut store);
        assert_eq!(
            result,
            Err(EngineError::DivisionByZero {
                target: "Ratio".to_string()
            })
        );
        assert_eq!(store.value(target), Ok(Value::from(9)));
    }

    #[test]
    fn test_non_number_target_fails() {
        let mut store = VariableStore::new();
        let flag = store.declare("Flag", false).unwrap();

        let result = NumberOperation::new(flag, Arithmetic::Add, 1, 2).execute(&mut store);
        assert!(matches!(result, Err(EngineError::KindMismatch { .. })));
    }
}
