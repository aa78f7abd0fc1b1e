//! # reactive-rules
//!
//! A reactive-variable rule engine: typed observable variables, conditions
//! that gate actions, and operations that rewrite variables and notify
//! observers.
//!
//! ## Design Principles
//!
//! 1. **Typed Cells**: A variable's kind (bool, int/float/double, or a 2 to
//!    4 component int/float vector) is fixed at declaration. Writes of
//!    another kind are rejected.
//!
//! 2. **Deterministic Order**: Gates short-circuit left to right. Operation
//!    lists run in the order given, and every operation sees the writes of
//!    the ones before it.
//!
//! 3. **Narrow Script Boundary**: Scripted conditions and operations talk
//!    to an [`ExpressionEvaluator`] through a flat name to value environment.
//!    The built-in [`ScriptEngine`] can be swapped out.
//!
//! ## Architecture
//!
//! - **Precision Merge**: Numeric operands compute at the higher of their
//!   precisions (`int < float < double`); only the final narrowing looks at
//!   the target.
//!
//! - **Write Then Raise**: An operation reads everything, writes its target
//!   once, then fires the change notification if its raise flag is set.
//!
//! ## Modules
//!
//! - `core`: values, variables, the variable store, references
//! - `script`: the evaluator boundary and the built-in expression engine
//! - `conditions`: predicates and the gate check
//! - `operations`: the four operation families and precision rules
//! - `batch`: gate-then-execute over operation lists
//! - `config`: serializable, versioned rule sets
//! - `error`: the engine error type

pub mod core;
pub mod script;
pub mod conditions;
pub mod operations;
pub mod batch;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Number, NumberKind, Value, VariableKind, VectorShape, VectorValue,
    Variable, VariableId, VariableStore, SubscriptionId,
    BoolReference, NumberReference, VectorReference,
};

pub use crate::script::{Bindings, EvalError, ExpressionEvaluator, ScriptConfig, ScriptEngine, ScriptValue};

pub use crate::conditions::{Comparison, Condition, Equality, PassConditions, ScriptedCondition};

pub use crate::operations::{
    Arithmetic, Rounding,
    BoolOperation, BoolOperator, NumberOperation, ScriptedNumberOperation, VectorOperation,
    Operation, Execution,
};

pub use crate::batch::{BatchExecutor, BatchReport, OperationFailure};

pub use crate::config::{ConfigError, Rule, RuleSet, VariableDef};

pub use crate::error::{EngineError, Result};
