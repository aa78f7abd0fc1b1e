//! Condition definitions and evaluation.
//!
//! A condition compares two references, or hands up to four of them to a
//! scripted expression. Evaluating a condition never writes a variable.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{BoolReference, NumberReference, VariableStore, VectorReference};
use crate::error::{EngineError, Result};
use crate::script::{Bindings, ExpressionEvaluator, ScriptValue};

/// Numeric comparison operators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    /// Apply the comparison. Every comparison involving NaN is false except
    /// `NotEqual`.
    #[must_use]
    pub fn compare(self, a: f64, b: f64) -> bool {
        match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::Greater => a > b,
            Self::GreaterOrEqual => a >= b,
            Self::Less => a < b,
            Self::LessOrEqual => a <= b,
        }
    }
}

/// Equality operators for kinds without an ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Equality {
    #[default]
    Equal,
    NotEqual,
}

impl Equality {
    /// Apply the comparison.
    #[must_use]
    pub fn test<T: PartialEq + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
        }
    }
}

/// A condition evaluated by an expression.
///
/// The expression sees four names: `nA` and `nB` (numbers, 0 when unbound)
/// and `bA` and `bB` (booleans, false when unbound). It should return a
/// boolean; anything else is logged and reduced to its truthiness.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCondition {
    /// The expression to evaluate.
    pub expression: String,
    /// Bound as `nA`.
    #[serde(default)]
    pub number_a: NumberReference,
    /// Bound as `nB`.
    #[serde(default)]
    pub number_b: NumberReference,
    /// Bound as `bA`.
    #[serde(default)]
    pub bool_a: BoolReference,
    /// Bound as `bB`.
    #[serde(default)]
    pub bool_b: BoolReference,
}

impl ScriptedCondition {
    /// Create a scripted condition with every input unbound.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Self::default()
        }
    }

    /// Set the `nA` and `nB` inputs (builder pattern).
    #[must_use]
    pub fn with_numbers(
        mut self,
        a: impl Into<NumberReference>,
        b: impl Into<NumberReference>,
    ) -> Self {
        self.number_a = a.into();
        self.number_b = b.into();
        self
    }

    /// Set the `bA` and `bB` inputs (builder pattern).
    #[must_use]
    pub fn with_bools(mut self, a: impl Into<BoolReference>, b: impl Into<BoolReference>) -> Self {
        self.bool_a = a.into();
        self.bool_b = b.into();
        self
    }

    /// Build the evaluator environment from current values.
    pub fn bindings(&self, store: &VariableStore) -> Result<Bindings> {
        Ok(Bindings::new()
            .with("nA", self.number_a.value_as_f64(store)?)
            .with("nB", self.number_b.value_as_f64(store)?)
            .with("bA", self.bool_a.resolve(store)?)
            .with("bB", self.bool_b.resolve(store)?))
    }

    /// Evaluate the expression.
    pub fn evaluate(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        let bindings = self.bindings(store)?;
        let result = evaluator
            .evaluate(&self.expression, &bindings)
            .map_err(|e| EngineError::script(&self.expression, e))?;

        match result {
            ScriptValue::Bool(b) => Ok(b),
            other => {
                warn!(
                    target: "conditions",
                    expression = %self.expression,
                    returned = other.type_name(),
                    "expression did not return a boolean; using its truthiness"
                );
                Ok(other.truthy())
            }
        }
    }
}

/// A predicate gating operations.
///
/// ## Modes
///
/// - `Bool`: compare two booleans for (in)equality
/// - `Number`: compare two numbers of any precision, widened to f64
/// - `Vector`: compare two vectors component-wise; the shorter one is
///   zero-padded, so `(1, 2)` equals `(1, 2, 0)`
/// - `Scripted`: evaluate an expression (see [`ScriptedCondition`])
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Bool {
        a: BoolReference,
        equality: Equality,
        b: BoolReference,
    },
    Number {
        a: NumberReference,
        comparison: Comparison,
        b: NumberReference,
    },
    Vector {
        a: VectorReference,
        equality: Equality,
        b: VectorReference,
    },
    Scripted(ScriptedCondition),
}

impl Condition {
    /// Create a boolean comparison.
    pub fn bools(a: impl Into<BoolReference>, equality: Equality, b: impl Into<BoolReference>) -> Self {
        Self::Bool {
            a: a.into(),
            equality,
            b: b.into(),
        }
    }

    /// Create a numeric comparison.
    pub fn numbers(
        a: impl Into<NumberReference>,
        comparison: Comparison,
        b: impl Into<NumberReference>,
    ) -> Self {
        Self::Number {
            a: a.into(),
            comparison,
            b: b.into(),
        }
    }

    /// Create a vector comparison.
    pub fn vectors(
        a: impl Into<VectorReference>,
        equality: Equality,
        b: impl Into<VectorReference>,
    ) -> Self {
        Self::Vector {
            a: a.into(),
            equality,
            b: b.into(),
        }
    }

    /// Create a scripted condition.
    pub fn scripted(condition: ScriptedCondition) -> Self {
        Self::Scripted(condition)
    }

    /// Check if the condition holds for the current variable values.
    pub fn evaluate(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        match self {
            Self::Bool { a, equality, b } => {
                Ok(equality.test(&a.resolve(store)?, &b.resolve(store)?))
            }
            Self::Number { a, comparison, b } => {
                Ok(comparison.compare(a.value_as_f64(store)?, b.value_as_f64(store)?))
            }
            Self::Vector { a, equality, b } => {
                let a = a.resolve(store)?.components();
                let b = b.resolve(store)?.components();
                Ok(equality.test(&a, &b))
            }
            Self::Scripted(scripted) => scripted.evaluate(store, evaluator),
        }
    }

    /// Check references and expressions against a store without evaluating.
    ///
    /// Every bound reference must exist and have a compatible kind, and a
    /// scripted expression must pass [`ExpressionEvaluator::validate`].
    pub fn validate(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<()> {
        match self {
            Self::Bool { a, b, .. } => {
                a.resolve(store)?;
                b.resolve(store)?;
            }
            Self::Number { a, b, .. } => {
                a.resolve(store)?;
                b.resolve(store)?;
            }
            Self::Vector { a, b, .. } => {
                a.resolve(store)?;
                b.resolve(store)?;
            }
            Self::Scripted(scripted) => {
                scripted.bindings(store)?;
                evaluator
                    .validate(&scripted.expression)
                    .map_err(|e| EngineError::script(&scripted.expression, e))?;
            }
        }
        Ok(())
    }
}

impl From<ScriptedCondition> for Condition {
    fn from(condition: ScriptedCondition) -> Self {
        Self::Scripted(condition)
    }
}
