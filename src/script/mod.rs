//! Scripted expressions.
//!
//! Conditions and operations that carry a textual expression hand it to an
//! [`ExpressionEvaluator`] together with a flat environment of named numbers
//! and booleans. The evaluator returns exactly one [`ScriptValue`] or an
//! [`EvalError`].
//!
//! ## Key Components
//!
//! - [`ExpressionEvaluator`]: the boundary conditions and operations call
//! - [`Bindings`]: the per-call name to value environment
//! - [`ScriptEngine`]: the built-in, Lua-flavoured evaluator
//! - [`ScriptConfig`]: limits that keep every call bounded
//!
//! ## Design Philosophy
//!
//! The boundary is deliberately narrow. Callers never see tokens, trees or
//! interpreter state, so another evaluator can be dropped in by
//! implementing the trait. Evaluation is synchronous: a call returns only
//! once it has a value or an error.

mod engine;
mod error;
pub mod lexer;
pub mod parser;
mod value;

pub use engine::{ScriptConfig, ScriptEngine};
pub use error::EvalError;
pub use value::{Bindings, ScriptValue};

/// Evaluates a textual expression against a name to value environment.
pub trait ExpressionEvaluator {
    /// Evaluate `expression` with `bindings` as its only environment.
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<ScriptValue, EvalError>;

    /// Check that `expression` is well formed without evaluating it.
    ///
    /// The default accepts everything; evaluators that can parse ahead of
    /// time should override this so configurations fail at load.
    fn validate(&self, expression: &str) -> Result<(), EvalError> {
        let _ = expression;
        Ok(())
    }
}
