//! Gate-then-execute over ordered operation lists.

use tracing::{debug, warn};

use crate::conditions::{Condition, PassConditions};
use crate::core::VariableStore;
use crate::error::{EngineError, Result};
use crate::operations::Operation;
use crate::script::ExpressionEvaluator;

/// An operation that failed inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationFailure {
    /// Index of the operation list.
    pub list: usize,
    /// Index of the operation within its list.
    pub index: usize,
    pub error: EngineError,
}

/// Outcome of one batch run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// Whether the gate passed.
    pub admitted: bool,
    /// Operations that wrote their target.
    pub executed: usize,
    /// Executed operations that fired a change notification.
    pub raised: usize,
    /// Operations that failed, in execution order.
    pub failures: Vec<OperationFailure>,
}

impl BatchReport {
    /// True if the gate passed and no operation failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.admitted && self.failures.is_empty()
    }
}

/// Runs operation lists behind a gate.
pub struct BatchExecutor;

impl BatchExecutor {
    /// Evaluate `gate`, then run every list in order if it passed.
    ///
    /// A missing or empty gate passes. An error while evaluating the gate
    /// is returned and nothing runs. Once admitted, a failing operation is
    /// logged and recorded and the batch continues with the next one.
    pub fn run(
        gate: Option<&[Condition]>,
        lists: &[Vec<Operation>],
        store: &mut VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        report.admitted = gate.pass_conditions(store, evaluator)?;
        if !report.admitted {
            debug!(target: "batch", "gate closed; nothing executed");
            return Ok(report);
        }

        for (list, operations) in lists.iter().enumerate() {
            for (index, operation) in operations.iter().enumerate() {
                match operation.execute(store, evaluator) {
                    Ok(execution) => {
                        report.executed += 1;
                        if execution.raised {
                            report.raised += 1;
                        }
                    }
                    Err(error) => {
                        warn!(
                            target: "batch",
                            list,
                            index,
                            family = operation.family(),
                            %error,
                            "operation failed"
                        );
                        report.failures.push(OperationFailure { list, index, error });
                    }
                }
            }
        }

        debug!(
            target: "batch",
            executed = report.executed,
            raised = report.raised,
            failed = report.failures.len(),
            "batch complete"
        );
        Ok(report)
    }
}
