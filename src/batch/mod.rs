//! Batch execution.
//!
//! A batch is a gate (a condition list) plus one or more operation lists.
//! If the gate passes, the lists run in the order given and each list runs
//! its operations in order. Every operation sees the writes of the ones
//! before it.
//!
//! Failures are scoped: a gate error cancels the whole batch, while an
//! operation error is recorded in the [`BatchReport`] and the batch moves
//! on.

mod executor;

pub use executor::{BatchExecutor, BatchReport, OperationFailure};
