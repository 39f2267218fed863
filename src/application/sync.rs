//! Tree synchronizer
//!
//! Applies a `SyncPlan` through a `HostTransport`, one operation at a time,
//! in plan order. Each operation is attempted once. The first failure, or
//! running past the deadline, stops the apply; whatever was not done is
//! reported as `remaining` so the next run can finish it.

use std::time::{Duration, Instant};

use crate::domain::entities::ConfigTree;
use crate::domain::ports::{DeployEvent, DeployEventSink, HostTransport, TransportError};
use crate::domain::services::SyncPlan;
use crate::domain::value_objects::{SyncOpKind, SyncOperation};

/// Time allowed for one apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncBudget {
    /// Minimum total deadline
    pub floor: Duration,
    /// Allowance per operation
    pub per_operation: Duration,
}

impl Default for SyncBudget {
    fn default() -> Self {
        Self {
            floor: Duration::from_secs(120),
            per_operation: Duration::from_secs(5),
        }
    }
}

impl SyncBudget {
    /// `max(floor, per_operation × operations)`
    pub fn deadline_for(&self, operations: usize) -> Duration {
        let scaled = self
            .per_operation
            .saturating_mul(u32::try_from(operations).unwrap_or(u32::MAX));
        scaled.max(self.floor)
    }
}

/// How an apply ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Complete {
        applied: Vec<SyncOperation>,
    },
    Partial {
        completed: Vec<SyncOperation>,
        remaining: Vec<SyncOperation>,
        reason: String,
    },
}

impl SyncOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, SyncOutcome::Complete { .. })
    }

    pub fn completed(&self) -> &[SyncOperation] {
        match self {
            SyncOutcome::Complete { applied } => applied,
            SyncOutcome::Partial { completed, .. } => completed,
        }
    }

    pub fn remaining(&self) -> &[SyncOperation] {
        match self {
            SyncOutcome::Complete { .. } => &[],
            SyncOutcome::Partial { remaining, .. } => remaining,
        }
    }
}

pub struct TreeSynchronizer<'a> {
    transport: &'a dyn HostTransport,
    budget: SyncBudget,
}

impl<'a> TreeSynchronizer<'a> {
    pub fn new(transport: &'a dyn HostTransport, budget: SyncBudget) -> Self {
        Self { transport, budget }
    }

    /// Apply `plan`, uploading content from `tree`.
    pub fn apply(
        &self,
        tree: &ConfigTree,
        plan: &SyncPlan,
        events: &dyn DeployEventSink,
    ) -> SyncOutcome {
        let operations = plan.operations();
        let deadline = self.budget.deadline_for(operations.len());
        let started = Instant::now();
        let detailed = events.wants_detailed_events();

        let _span = tracing::info_span!(
            "apply",
            destination = %self.transport.describe(),
            operations = operations.len()
        )
        .entered();

        for (index, op) in operations.iter().enumerate() {
            if started.elapsed() >= deadline {
                tracing::warn!(index, "sync deadline exceeded");
                return partial(
                    operations,
                    index,
                    format!("sync deadline of {}s exceeded", deadline.as_secs()),
                );
            }

            if detailed {
                events.on_event(DeployEvent::OperationStarted {
                    index,
                    total: operations.len(),
                    kind: op.kind,
                    path: op.path.clone(),
                });
            }

            if let Err(err) = self.apply_one(tree, op) {
                tracing::error!(path = %op.path, kind = %op.kind, error = %err, "operation failed");
                events.on_event(DeployEvent::OperationFailed {
                    index,
                    kind: op.kind,
                    path: op.path.clone(),
                    error: err.to_string(),
                });
                return partial(operations, index, format!("{} {}: {}", op.kind, op.path, err));
            }

            tracing::debug!(path = %op.path, kind = %op.kind, "operation applied");
            if detailed {
                events.on_event(DeployEvent::OperationApplied {
                    index,
                    kind: op.kind,
                    path: op.path.clone(),
                });
            }
        }

        SyncOutcome::Complete {
            applied: operations.to_vec(),
        }
    }

    fn apply_one(&self, tree: &ConfigTree, op: &SyncOperation) -> Result<(), TransportError> {
        match op.kind {
            SyncOpKind::Create | SyncOpKind::Update => {
                let file = tree.get(&op.path).ok_or_else(|| {
                    TransportError::Io(format!("'{}' is not part of the tree", op.path))
                })?;
                self.transport.upload(&op.path, file.content())
            }
            SyncOpKind::Delete => self.transport.delete(&op.path),
        }
    }
}

fn partial(operations: &[SyncOperation], stopped_at: usize, reason: String) -> SyncOutcome {
    SyncOutcome::Partial {
        completed: operations[..stopped_at].to_vec(),
        remaining: operations[stopped_at..].to_vec(),
        reason,
    }
}
