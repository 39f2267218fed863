//! Deploy Result
//!
//! What a pipeline run hands back to its caller.

use crate::domain::entities::{DeploymentResult, DeploymentStatus};
use crate::domain::services::{SyncPlan, ValidationReport};

/// Result of a deploy operation
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// The record appended to the audit log
    pub result: DeploymentResult,
    pub report: ValidationReport,
    /// Present once the run got as far as planning
    pub plan: Option<SyncPlan>,
    /// Set when the record could not be appended to the audit log
    pub audit_error: Option<String>,
}

impl DeployOutcome {
    pub fn status(&self) -> DeploymentStatus {
        self.result.status()
    }

    pub fn is_success(&self) -> bool {
        self.result.status().is_success()
    }
}
