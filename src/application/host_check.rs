//! Dry-run host check
//!
//! Stages a copy of the tree in a scratch directory on the host, asks the
//! runtime to check that copy, then removes it. The live configuration is
//! never touched.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ConfigTree, HostCheckSummary};
use crate::domain::ports::{HostRuntime, HostTransport, RuntimeError};

/// Scratch directory (host-relative) that staged trees live under
pub const STAGING_ROOT: &str = ".hapsync-staging";

/// Whether the host check runs and whether it may be skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostCheckMode {
    /// Run it; an unreachable host degrades the run instead of failing it
    #[default]
    Auto,
    /// Run it; an unreachable host fails the run
    Required,
    Off,
}

impl std::str::FromStr for HostCheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(HostCheckMode::Auto),
            "required" => Ok(HostCheckMode::Required),
            "off" | "skip" => Ok(HostCheckMode::Off),
            other => Err(format!("unknown host check mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCheckVerdict {
    Pass,
    Fail { details: String },
    Unreachable { reason: String },
}

impl HostCheckVerdict {
    pub fn summary(&self) -> HostCheckSummary {
        match self {
            HostCheckVerdict::Pass => HostCheckSummary::Passed,
            HostCheckVerdict::Fail { details } => HostCheckSummary::Failed {
                details: details.clone(),
            },
            HostCheckVerdict::Unreachable { reason } => HostCheckSummary::Unreachable {
                reason: reason.clone(),
            },
        }
    }
}

pub struct HostChecker<'a> {
    transport: &'a dyn HostTransport,
    runtime: &'a dyn HostRuntime,
    timeout: Duration,
    command_timeout: Duration,
    /// Live host files copied next to the staged tree (e.g. `secrets.yaml`)
    carry_over: Vec<String>,
}

impl<'a> HostChecker<'a> {
    pub fn new(
        transport: &'a dyn HostTransport,
        runtime: &'a dyn HostRuntime,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            runtime,
            timeout,
            command_timeout: Duration::from_secs(30),
            carry_over: vec!["secrets.yaml".to_string()],
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_carry_over(mut self, paths: Vec<String>) -> Self {
        self.carry_over = paths;
        self
    }

    /// Stage `tree` under `STAGING_ROOT/<run_id>` and run the runtime check.
    ///
    /// `timeout` bounds the whole check: staging uploads, the carry-over
    /// copy and the runtime call share one deadline. Running out is a Fail.
    pub fn check(&self, tree: &ConfigTree, run_id: &str) -> HostCheckVerdict {
        let deadline = Instant::now() + self.timeout;
        let staged = format!("{}/{}", STAGING_ROOT, run_id);
        let _span = tracing::info_span!("host_check", staged = %staged).entered();

        let verdict = match self.stage(tree, &staged, deadline) {
            Err(verdict) => verdict,
            Ok(()) => match remaining(deadline) {
                None => self.timed_out("staging"),
                Some(left) => match self.runtime.check_config(&staged, left) {
                    Ok(()) => HostCheckVerdict::Pass,
                    Err(RuntimeError::Rejected { details }) => HostCheckVerdict::Fail { details },
                    Err(RuntimeError::TimedOut { .. }) => self.timed_out("checking"),
                    Err(RuntimeError::Unreachable(reason)) => {
                        HostCheckVerdict::Unreachable { reason }
                    }
                },
            },
        };

        self.cleanup(&staged);
        tracing::info!(?verdict, "host check finished");
        verdict
    }

    fn stage(
        &self,
        tree: &ConfigTree,
        staged: &str,
        deadline: Instant,
    ) -> Result<(), HostCheckVerdict> {
        for file in tree.files() {
            if remaining(deadline).is_none() {
                return Err(self.timed_out("staging"));
            }
            self.transport
                .upload(&format!("{}/{}", staged, file.path()), file.content())
                .map_err(|e| unreachable_staging(e.to_string()))?;
        }

        for path in &self.carry_over {
            if tree.contains_file(path) {
                continue;
            }
            let Some(left) = remaining(deadline) else {
                return Err(self.timed_out("staging"));
            };
            let command = format!(
                "if [ -f {live} ]; then cp {live} {staged}; fi",
                live = quote(&self.transport.host_path(path)),
                staged = quote(&self.transport.host_path(&format!("{}/{}", staged, path))),
            );
            let output = self
                .transport
                .execute(&command, left.min(self.command_timeout))
                .map_err(|e| unreachable_staging(e.to_string()))?;
            if !output.success() {
                return Err(unreachable_staging(format!(
                    "copying {}: {}",
                    path,
                    output.failure_summary()
                )));
            }
        }
        Ok(())
    }

    fn timed_out(&self, phase: &str) -> HostCheckVerdict {
        tracing::warn!(phase, timeout_secs = self.timeout.as_secs(), "host check ran out of time");
        HostCheckVerdict::Fail {
            details: format!(
                "configuration check timed out after {}s",
                self.timeout.as_secs()
            ),
        }
    }

    fn cleanup(&self, staged: &str) {
        let command = format!("rm -rf {}", quote(&self.transport.host_path(staged)));
        match self.transport.execute(&command, self.command_timeout) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                tracing::warn!(error = %output.failure_summary(), "failed to remove staged tree")
            }
            Err(err) => tracing::warn!(error = %err, "failed to remove staged tree"),
        }
    }
}

fn unreachable_staging(reason: String) -> HostCheckVerdict {
    tracing::warn!(%reason, "could not stage tree on host");
    HostCheckVerdict::Unreachable { reason }
}

/// Time left before `deadline`, if any
fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
}

/// Single-quote a string for a POSIX shell
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
