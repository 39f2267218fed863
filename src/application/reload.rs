//! Reload orchestration
//!
//! `Idle → Triggered → AwaitingHealthCheck → Healthy | Unhealthy`
//!
//! After a successful apply the runtime is asked to reload, then polled for
//! health a fixed number of times with linear backoff (attempt `n` waits
//! `n × backoff` first). Nothing here ever rolls the host back.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::entities::ReloadOutcome;
use crate::domain::ports::{DeployEvent, DeployEventSink, HostRuntime};

/// When to reload after an apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    Never,
    /// Only when the apply changed something
    #[default]
    OnChange,
    Always,
}

impl ReloadPolicy {
    pub fn should_reload(&self, changed: bool) -> bool {
        match self {
            ReloadPolicy::Never => false,
            ReloadPolicy::OnChange => changed,
            ReloadPolicy::Always => true,
        }
    }
}

impl FromStr for ReloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "never" => Ok(ReloadPolicy::Never),
            "on-change" => Ok(ReloadPolicy::OnChange),
            "always" => Ok(ReloadPolicy::Always),
            other => Err(format!("unknown reload policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    Idle,
    Triggered,
    AwaitingHealthCheck,
    Healthy,
    Unhealthy,
}

/// Health polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            retries: 10,
            backoff: Duration::from_secs(3),
        }
    }
}

impl HealthPolicy {
    /// Wait before probe `attempt` (1-based)
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Sleeps between health probes. Tests substitute a recorder.
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration);
}

pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct ReloadOrchestrator<'a> {
    runtime: &'a dyn HostRuntime,
    health: HealthPolicy,
    pause: &'a dyn Pause,
    history: Vec<ReloadState>,
}

impl<'a> ReloadOrchestrator<'a> {
    pub fn new(runtime: &'a dyn HostRuntime, health: HealthPolicy, pause: &'a dyn Pause) -> Self {
        Self {
            runtime,
            health,
            pause,
            history: vec![ReloadState::Idle],
        }
    }

    pub fn state(&self) -> ReloadState {
        self.history
            .last()
            .copied()
            .unwrap_or(ReloadState::Idle)
    }

    /// Every state visited so far, starting with `Idle`
    pub fn history(&self) -> &[ReloadState] {
        &self.history
    }

    fn enter(&mut self, state: ReloadState) {
        tracing::debug!(from = ?self.state(), to = ?state, "reload state");
        self.history.push(state);
    }

    /// Trigger a reload and wait for the host to report healthy.
    pub fn run(&mut self, events: &dyn DeployEventSink) -> ReloadOutcome {
        let _span = tracing::info_span!("reload").entered();

        self.enter(ReloadState::Triggered);
        events.on_event(DeployEvent::ReloadTriggered);
        if let Err(err) = self.runtime.reload() {
            tracing::error!(error = %err, "reload command failed");
            self.enter(ReloadState::Unhealthy);
            return ReloadOutcome::ReloadFailed {
                reason: err.to_string(),
            };
        }

        self.enter(ReloadState::AwaitingHealthCheck);
        let attempts = self.health.retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            self.pause.pause(self.health.delay_before(attempt));
            match self.runtime.health() {
                Ok(()) => {
                    events.on_event(DeployEvent::HealthProbe {
                        attempt,
                        healthy: true,
                    });
                    tracing::info!(attempt, "host healthy");
                    self.enter(ReloadState::Healthy);
                    return ReloadOutcome::Healthy { attempts: attempt };
                }
                Err(err) => {
                    events.on_event(DeployEvent::HealthProbe {
                        attempt,
                        healthy: false,
                    });
                    tracing::debug!(attempt, error = %err, "health probe failed");
                    last_error = err.to_string();
                }
            }
        }

        tracing::warn!(attempts, error = %last_error, "host did not become healthy");
        self.enter(ReloadState::Unhealthy);
        ReloadOutcome::Unhealthy {
            attempts,
            reason: last_error,
        }
    }
}
