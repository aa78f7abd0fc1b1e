//! Expression evaluator errors.

use thiserror::Error;

/// Errors produced while checking or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Input the lexer could not tokenize.
    #[error("invalid token at byte {position}")]
    InvalidToken {
        /// Byte offset of the bad input.
        position: usize,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected '{found}' at byte {position}, expected {expected}")]
    UnexpectedToken {
        /// Byte offset of the token.
        position: usize,
        /// The token text.
        found: String,
        /// What the parser was looking for.
        expected: String,
    },

    /// The expression ended early.
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: String,
    },

    /// A name that is not in the environment.
    #[error("unknown name '{0}'")]
    UnknownName(String),

    /// A call to a function the evaluator does not provide.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments.
    #[error("function '{function}' takes {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: String,
        /// Accepted argument count, e.g. `"1"` or `"at least 1"`.
        expected: &'static str,
        /// Supplied argument count.
        found: usize,
    },

    /// An operator was applied to a value of the wrong type.
    #[error("cannot apply {operation} to a {found} value")]
    TypeMismatch {
        /// The operator or function.
        operation: &'static str,
        /// Type name of the offending operand.
        found: &'static str,
    },

    /// The source text exceeds the configured length.
    #[error("expression is {length} bytes, limit is {limit}")]
    TooLong {
        /// Source length in bytes.
        length: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The expression nests deeper than the configured limit, either
    /// through parentheses or through a long operator chain.
    #[error("expression nests deeper than {limit} levels")]
    TooDeep {
        /// Configured limit.
        limit: u32,
    },

    /// Evaluation took more steps than the configured budget.
    #[error("evaluation exceeded {limit} steps")]
    StepLimit {
        /// Configured limit.
        limit: u32,
    },
}
