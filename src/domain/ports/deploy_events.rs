//! Deploy Event Port
//!
//! Provides an observable interface for pipeline runs.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use crate::domain::entities::{DeploymentStatus, HostCheckSummary};
use crate::domain::value_objects::SyncOpKind;

/// Event emitted during a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Run started
    Started {
        run_id: String,
        source: PathBuf,
        destination: String,
        file_count: usize,
    },

    /// Local validation finished
    Validated { errors: usize, warnings: usize },

    /// Dry-run host check finished
    HostChecked { outcome: HostCheckSummary },

    /// Sync plan computed
    Planned {
        creates: usize,
        updates: usize,
        deletes: usize,
    },

    /// One operation is about to run
    OperationStarted {
        index: usize,
        total: usize,
        kind: SyncOpKind,
        path: String,
    },

    /// One operation finished
    OperationApplied {
        index: usize,
        kind: SyncOpKind,
        path: String,
    },

    /// One operation failed; the apply stops here
    OperationFailed {
        index: usize,
        kind: SyncOpKind,
        path: String,
        error: String,
    },

    /// Reload command sent
    ReloadTriggered,

    /// One health probe answered
    HealthProbe { attempt: u32, healthy: bool },

    /// Run finished
    Completed {
        status: DeploymentStatus,
        completed: usize,
        remaining: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress lines on stderr
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-operation events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
