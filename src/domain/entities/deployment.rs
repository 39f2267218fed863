//! Deployment entity - the record of one pipeline run
//!
//! A run accumulates facts in a `DeploymentRecorder`; `finish` consumes the
//! recorder, so every run produces exactly one immutable `DeploymentResult`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Fingerprint, SyncOperation};

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Changes applied and the host reported healthy (or no reload was needed)
    Deployed,
    /// Host already matched the tree
    NoChanges,
    /// Dry run: the plan was computed but not applied
    Planned,
    ValidationFailed,
    HostCheckFailed,
    /// Host unreachable while reading its manifest
    TransportFailure,
    /// Apply stopped part-way; see `remaining`
    PartialSync,
    /// Changes applied but reload or health polling failed
    DeployedButUnhealthy,
    /// Interrupted before any host change was made
    Cancelled,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::NoChanges => "no_changes",
            DeploymentStatus::Planned => "planned",
            DeploymentStatus::ValidationFailed => "validation_failed",
            DeploymentStatus::HostCheckFailed => "host_check_failed",
            DeploymentStatus::TransportFailure => "transport_failure",
            DeploymentStatus::PartialSync => "partial_sync",
            DeploymentStatus::DeployedButUnhealthy => "deployed_but_unhealthy",
            DeploymentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the command that produced this status succeeded
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::Deployed | DeploymentStatus::NoChanges | DeploymentStatus::Planned
        )
    }

    /// Whether the host is known to run exactly this tree, healthy.
    ///
    /// Only these runs are candidates for "last known good".
    pub fn is_known_good(&self) -> bool {
        matches!(self, DeploymentStatus::Deployed | DeploymentStatus::NoChanges)
    }

    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            DeploymentStatus::Deployed | DeploymentStatus::NoChanges | DeploymentStatus::Planned => 0,
            DeploymentStatus::ValidationFailed => 1,
            DeploymentStatus::HostCheckFailed => 2,
            DeploymentStatus::TransportFailure => 3,
            DeploymentStatus::PartialSync => 4,
            DeploymentStatus::DeployedButUnhealthy => 5,
            DeploymentStatus::Cancelled => 130,
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the dry-run host check concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HostCheckSummary {
    Skipped,
    Passed,
    Failed { details: String },
    Unreachable { reason: String },
}

/// What happened after the tree was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReloadOutcome {
    /// Reload policy did not call for a reload
    NotTriggered,
    Healthy { attempts: u32 },
    Unhealthy { attempts: u32, reason: String },
    /// The reload command itself failed
    ReloadFailed { reason: String },
}

impl ReloadOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ReloadOutcome::NotTriggered | ReloadOutcome::Healthy { .. })
    }
}

/// Validation counts kept in the audit record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
}

/// Immutable record of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    tree_digest: Fingerprint,
    #[serde(default)]
    source_revision: Option<String>,
    destination: String,
    validation: ValidationSummary,
    host_check: HostCheckSummary,
    /// Host check could not run; only local validation gated this run
    #[serde(default)]
    degraded: bool,
    plan_size: usize,
    #[serde(default)]
    completed: Vec<SyncOperation>,
    #[serde(default)]
    remaining: Vec<SyncOperation>,
    reload: ReloadOutcome,
    status: DeploymentStatus,
    #[serde(default)]
    failure_reason: Option<String>,
}

impl DeploymentResult {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn tree_digest(&self) -> &Fingerprint {
        &self.tree_digest
    }

    pub fn source_revision(&self) -> Option<&str> {
        self.source_revision.as_deref()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn validation(&self) -> ValidationSummary {
        self.validation
    }

    pub fn host_check(&self) -> &HostCheckSummary {
        &self.host_check
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn plan_size(&self) -> usize {
        self.plan_size
    }

    pub fn completed(&self) -> &[SyncOperation] {
        &self.completed
    }

    pub fn remaining(&self) -> &[SyncOperation] {
        &self.remaining
    }

    pub fn reload(&self) -> &ReloadOutcome {
        &self.reload
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}

/// Mutable accumulator used while a run is in progress
#[derive(Debug)]
pub struct DeploymentRecorder {
    id: Uuid,
    started_at: DateTime<Utc>,
    tree_digest: Fingerprint,
    source_revision: Option<String>,
    destination: String,
    validation: ValidationSummary,
    host_check: HostCheckSummary,
    degraded: bool,
    plan_size: usize,
    completed: Vec<SyncOperation>,
    remaining: Vec<SyncOperation>,
    reload: ReloadOutcome,
}

impl DeploymentRecorder {
    pub fn start(
        tree_digest: Fingerprint,
        source_revision: Option<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            tree_digest,
            source_revision,
            destination: destination.into(),
            validation: ValidationSummary::default(),
            host_check: HostCheckSummary::Skipped,
            degraded: false,
            plan_size: 0,
            completed: Vec::new(),
            remaining: Vec::new(),
            reload: ReloadOutcome::NotTriggered,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record_validation(&mut self, errors: usize, warnings: usize) {
        self.validation = ValidationSummary { errors, warnings };
    }

    pub fn record_host_check(&mut self, summary: HostCheckSummary) {
        if matches!(summary, HostCheckSummary::Unreachable { .. }) {
            self.degraded = true;
        }
        self.host_check = summary;
    }

    pub fn record_plan(&mut self, plan_size: usize) {
        self.plan_size = plan_size;
    }

    pub fn record_sync(&mut self, completed: Vec<SyncOperation>, remaining: Vec<SyncOperation>) {
        self.completed = completed;
        self.remaining = remaining;
    }

    pub fn record_reload(&mut self, outcome: ReloadOutcome) {
        self.reload = outcome;
    }

    /// Close the run. Consumes the recorder.
    pub fn finish(self, status: DeploymentStatus, failure_reason: Option<String>) -> DeploymentResult {
        DeploymentResult {
            id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            tree_digest: self.tree_digest,
            source_revision: self.source_revision,
            destination: self.destination,
            validation: self.validation,
            host_check: self.host_check,
            degraded: self.degraded,
            plan_size: self.plan_size,
            completed: self.completed,
            remaining: self.remaining,
            reload: self.reload,
            status,
            failure_reason,
        }
    }
}
