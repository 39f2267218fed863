//! Plan Approver Port
//!
//! Decides whether a computed sync plan may be applied. Interactive runs ask
//! the operator before deleting anything on the host.

use crate::domain::value_objects::SyncOperation;

pub trait PlanApprover: Send + Sync {
    /// Return `true` to apply the plan.
    fn approve(&self, destination: &str, operations: &[SyncOperation]) -> bool;
}

/// Approves every plan. Use with `--yes`, `--json` or non-interactive runs.
pub struct AutoApprove;

impl PlanApprover for AutoApprove {
    fn approve(&self, _destination: &str, _operations: &[SyncOperation]) -> bool {
        true
    }
}
