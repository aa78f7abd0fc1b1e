//! Operations that mutate a target variable.
//!
//! Four families share one contract:
//! - [`BoolOperation`]: boolean function of two bool references
//! - [`NumberOperation`]: arithmetic on two numbers of any precision
//! - [`ScriptedNumberOperation`]: a numeric expression over the target
//!   and two auxiliary numbers
//! - [`VectorOperation`]: component-wise arithmetic on two vectors
//!
//! [`Operation`] closes over them so batches iterate one type.
//!
//! ## Execution contract
//!
//! Executing reads every input and the raise flag, computes the result,
//! writes the target once, then fires its change notification if the
//! raise flag resolved true. Any failure happens before the write.
//!
//! Precision handling lives in [`precision`].

pub mod precision;
mod bool_op;
mod number_op;
mod scripted_op;
mod vector_op;
mod operation;

pub use precision::{merge_precision, merge_vector_shape, Arithmetic, Rounding};
pub use bool_op::{BoolOperation, BoolOperator};
pub use number_op::NumberOperation;
pub use scripted_op::ScriptedNumberOperation;
pub use vector_op::VectorOperation;
pub use operation::{Execution, Operation};

use operation::{commit, number_target, vector_target};
