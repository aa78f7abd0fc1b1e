//! Engine errors.
//!
//! Errors fall into three groups:
//!
//! - **Configuration errors**: [`EngineError::KindMismatch`],
//!   [`EngineError::UnknownVariable`], [`EngineError::DuplicateVariable`].
//!   These are authoring mistakes and surface at the point of use.
//! - **Computation errors**: [`EngineError::DivisionByZero`],
//!   [`EngineError::NonNumericResult`].
//! - **Script errors**: [`EngineError::Script`] wraps an [`EvalError`]
//!   together with the expression that produced it.
//!
//! Unbound references are not errors; they resolve to zero/false.

use thiserror::Error;

use crate::core::{VariableId, VariableKind};
use crate::script::EvalError;

/// Engine result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while evaluating conditions or executing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A value or reference of the wrong kind met a variable.
    ///
    /// Variables never change kind, so this is always a configuration bug.
    #[error("variable '{variable}' is {found}, expected {expected}")]
    KindMismatch {
        /// Name of the variable involved.
        variable: String,
        /// Kind the caller required (`"number"` and `"vector"` accept any precision/shape).
        expected: String,
        /// Kind the variable actually has.
        found: VariableKind,
    },

    /// A reference points at an id the store never issued.
    #[error("unknown variable: {0}")]
    UnknownVariable(VariableId),

    /// A second variable was declared under an existing name.
    #[error("duplicate variable name: '{0}'")]
    DuplicateVariable(String),

    /// Integer-precision division or modulo by zero.
    #[error("integer division by zero while computing '{target}'")]
    DivisionByZero {
        /// Name of the target variable.
        target: String,
    },

    /// A numeric-context expression returned something other than a number.
    #[error("expression '{expression}' did not return a number (returned {found})")]
    NonNumericResult {
        /// The offending expression.
        expression: String,
        /// Type name of the value it returned.
        found: &'static str,
    },

    /// The expression evaluator failed.
    #[error("expression '{expression}' failed: {source}")]
    Script {
        /// The offending expression.
        expression: String,
        /// Underlying evaluator error.
        #[source]
        source: EvalError,
    },
}

impl EngineError {
    /// Wrap an evaluator error with its expression.
    pub fn script(expression: impl Into<String>, source: EvalError) -> Self {
        Self::Script {
            expression: expression.into(),
            source,
        }
    }
}
