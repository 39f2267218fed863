//! AuditLog port - append-only history of deployment runs
//!
//! The log is the operator's answer to "what is on the host, and what was
//! the last tree that worked".

use thiserror::Error;

use crate::domain::entities::DeploymentResult;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit log line {line} is not a deployment record: {message}")]
    Corrupt { line: usize, message: String },

    #[error("failed to encode deployment record: {0}")]
    Encode(String),
}

pub trait AuditLog: Send + Sync {
    /// Append one record. Records are never rewritten.
    fn append(&self, result: &DeploymentResult) -> Result<(), AuditError>;

    /// All records, oldest first
    fn entries(&self) -> Result<Vec<DeploymentResult>, AuditError>;

    /// Most recent run that left the host healthy on a known tree
    fn last_successful(&self) -> Result<Option<DeploymentResult>, AuditError> {
        Ok(self
            .entries()?
            .into_iter()
            .rev()
            .find(|r| r.status().is_known_good()))
    }
}
