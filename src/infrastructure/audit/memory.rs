//! In-memory Audit Log

use std::sync::{Arc, Mutex};

use crate::domain::entities::DeploymentResult;
use crate::domain::ports::{AuditError, AuditLog};

/// Audit log kept in memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<DeploymentResult>>>,
    read_only: bool,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that rejects every append
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, result: &DeploymentResult) -> Result<(), AuditError> {
        if self.read_only {
            return Err(AuditError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "audit log is read-only",
            )));
        }
        self.records
            .lock()
            .map_err(|_| AuditError::Encode("audit log lock poisoned".to_string()))?
            .push(result.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<DeploymentResult>, AuditError> {
        Ok(self
            .records
            .lock()
            .map_err(|_| AuditError::Encode("audit log lock poisoned".to_string()))?
            .clone())
    }
}
