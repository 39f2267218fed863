//! Deploy Options
//!
//! Configuration types for pipeline runs.

use std::time::Duration;

use crate::application::host_check::HostCheckMode;
use crate::application::reload::{HealthPolicy, ReloadPolicy};
use crate::application::sync::SyncBudget;
use crate::domain::services::ValidationOptions;
use crate::domain::value_objects::ManagedScope;

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Per-file validation settings
    pub validation: ValidationOptions,
    /// Host paths the synchronizer may touch
    pub scope: ManagedScope,
    pub host_check: HostCheckMode,
    pub host_check_timeout: Duration,
    /// Timeout for helper commands (staging, cleanup)
    pub command_timeout: Duration,
    pub sync_budget: SyncBudget,
    pub reload_policy: ReloadPolicy,
    pub health: HealthPolicy,
    /// Stop after planning
    pub dry_run: bool,
    /// Git revision of the source tree, when known
    pub source_revision: Option<String>,
}

impl DeployOptions {
    pub fn new(scope: ManagedScope) -> Self {
        Self {
            validation: ValidationOptions {
                scope: scope.clone(),
                ..ValidationOptions::default()
            },
            scope,
            host_check: HostCheckMode::default(),
            host_check_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
            sync_budget: SyncBudget::default(),
            reload_policy: ReloadPolicy::default(),
            health: HealthPolicy::default(),
            dry_run: false,
            source_revision: None,
        }
    }

    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_host_check(mut self, mode: HostCheckMode) -> Self {
        self.host_check = mode;
        self
    }

    pub fn with_host_check_timeout(mut self, timeout: Duration) -> Self {
        self.host_check_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_sync_budget(mut self, budget: SyncBudget) -> Self {
        self.sync_budget = budget;
        self
    }

    pub fn with_reload_policy(mut self, policy: ReloadPolicy) -> Self {
        self.reload_policy = policy;
        self
    }

    pub fn with_health(mut self, health: HealthPolicy) -> Self {
        self.health = health;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_source_revision(mut self, revision: Option<String>) -> Self {
        self.source_revision = revision;
        self
    }
}
