//! Check Use Case
//!
//! Validation without deployment: the local checks, optionally followed by
//! the dry-run host check. Nothing is synced and nothing is recorded in the
//! audit log.

use std::sync::Arc;
use std::time::Duration;

use crate::application::host_check::{HostCheckMode, HostCheckVerdict, HostChecker};
use crate::domain::entities::{ConfigTree, HostCheckSummary, StateRegistry};
use crate::domain::ports::{HostRuntime, HostTransport};
use crate::domain::services::{validate, ValidationOptions, ValidationReport};

/// Options for the check operation
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub validation: ValidationOptions,
    pub host_check: HostCheckMode,
    pub host_check_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            validation: ValidationOptions::default(),
            host_check: HostCheckMode::Off,
            host_check_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Overall verdict of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// Local validation passed but the host check could not run
    Degraded,
    Fail,
}

/// Result of the check operation
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub report: ValidationReport,
    pub host_check: HostCheckSummary,
    pub status: CheckStatus,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.status != CheckStatus::Fail
    }
}

/// Check Use Case
pub struct CheckUseCase {
    registry: StateRegistry,
    host: Option<(Arc<dyn HostTransport>, Arc<dyn HostRuntime>)>,
}

impl CheckUseCase {
    /// Local checks only
    pub fn new(registry: StateRegistry) -> Self {
        Self {
            registry,
            host: None,
        }
    }

    /// Enable the host check through `transport` and `runtime`
    pub fn with_host(
        mut self,
        transport: Arc<dyn HostTransport>,
        runtime: Arc<dyn HostRuntime>,
    ) -> Self {
        self.host = Some((transport, runtime));
        self
    }

    pub fn execute(&self, tree: &ConfigTree, options: &CheckOptions) -> CheckResult {
        let report = validate(tree, &self.registry, &options.validation);

        if !report.is_valid() {
            return CheckResult {
                report,
                host_check: HostCheckSummary::Skipped,
                status: CheckStatus::Fail,
            };
        }

        let (transport, runtime) = match (&self.host, options.host_check) {
            (Some(host), HostCheckMode::Auto | HostCheckMode::Required) => host,
            _ => {
                return CheckResult {
                    report,
                    host_check: HostCheckSummary::Skipped,
                    status: CheckStatus::Pass,
                }
            }
        };

        let run_id = format!("check-{}", uuid::Uuid::new_v4());
        let verdict = HostChecker::new(transport.as_ref(), runtime.as_ref(), options.host_check_timeout)
            .with_command_timeout(options.command_timeout)
            .check(tree, &run_id);

        let status = match (&verdict, options.host_check) {
            (HostCheckVerdict::Pass, _) => CheckStatus::Pass,
            (HostCheckVerdict::Fail { .. }, _) => CheckStatus::Fail,
            (HostCheckVerdict::Unreachable { .. }, HostCheckMode::Required) => CheckStatus::Fail,
            (HostCheckVerdict::Unreachable { .. }, _) => CheckStatus::Degraded,
        };

        CheckResult {
            report,
            host_check: verdict.summary(),
            status,
        }
    }
}
