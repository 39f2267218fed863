//! Sync operations
//!
//! A single host-side change. Plans, partial-sync reports and the audit log
//! all speak in these.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOpKind {
    /// Path missing on the host
    Create,
    /// Path present on the host with a different fingerprint
    Update,
    /// Host path inside the managed roots with no tree entry
    Delete,
}

impl SyncOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOpKind::Create => "create",
            SyncOpKind::Update => "update",
            SyncOpKind::Delete => "delete",
        }
    }

    /// Single-character marker for compact listings
    pub fn symbol(&self) -> char {
        match self {
            SyncOpKind::Create => '+',
            SyncOpKind::Update => '~',
            SyncOpKind::Delete => '-',
        }
    }
}

impl fmt::Display for SyncOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned change to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOperation {
    pub kind: SyncOpKind,
    pub path: String,
    /// Fingerprint of the content to upload; `None` for deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
}

impl SyncOperation {
    pub fn create(path: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            kind: SyncOpKind::Create,
            path: path.into(),
            fingerprint: Some(fingerprint),
        }
    }

    pub fn update(path: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            kind: SyncOpKind::Update,
            path: path.into(),
            fingerprint: Some(fingerprint),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            kind: SyncOpKind::Delete,
            path: path.into(),
            fingerprint: None,
        }
    }

    pub fn is_upload(&self) -> bool {
        !matches!(self.kind, SyncOpKind::Delete)
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}
