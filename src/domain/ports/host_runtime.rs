//! Host Runtime Port
//!
//! The home-automation runtime on the host: something that can check a
//! configuration directory, reload itself and answer a health probe.

use std::time::Duration;

use super::host_transport::TransportError;

/// Why a runtime request did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime answered and said no
    Rejected { details: String },
    /// The request did not finish in time
    TimedOut { secs: u64 },
    /// The host could not be reached
    Unreachable(String),
}

impl From<TransportError> for RuntimeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { secs, .. } => RuntimeError::TimedOut { secs },
            TransportError::Connection(msg) => RuntimeError::Unreachable(msg),
            other => RuntimeError::Rejected {
                details: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { details } => write!(f, "{}", details),
            Self::TimedOut { secs } => write!(f, "timed out after {}s", secs),
            Self::Unreachable(msg) => write!(f, "host unreachable: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

pub trait HostRuntime: Send + Sync {
    /// Validate the configuration staged at `staged_dir` (tree-relative)
    fn check_config(&self, staged_dir: &str, timeout: Duration) -> Result<(), RuntimeError>;

    /// Ask the runtime to pick up the live configuration
    fn reload(&self) -> Result<(), RuntimeError>;

    /// Single health probe
    fn health(&self) -> Result<(), RuntimeError>;
}
