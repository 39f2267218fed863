//! Host Transport Port
//!
//! Abstracts how files reach the managed host and how commands run there
//! (SSH, or a directory on the same machine). The synchronizer, the host
//! checker and the runtime only ever talk to the host through this trait.

use std::time::Duration;

use crate::domain::entities::HostManifest;
use crate::domain::value_objects::ManagedScope;

/// Error talking to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Host could not be reached at all
    Connection(String),
    /// A remote command exceeded its timeout
    Timeout { command: String, secs: u64 },
    /// A remote command ran and exited unsuccessfully
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    /// Local or remote file I/O failed
    Io(String),
}

impl TransportError {
    /// Whether the failure means the host is unreachable (as opposed to the
    /// host answering with an error)
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Connection(_))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Timeout { command, secs } => {
                write!(f, "Command timed out after {}s: {}", secs, command)
            }
            Self::CommandFailed {
                command,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "Command failed (exit {}): {}", code, command)?,
                    None => write!(f, "Command failed: {}", command)?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Captured output of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Best single-line summary of why a command failed
    pub fn failure_summary(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        if text.is_empty() {
            match self.status {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            text.to_string()
        }
    }
}

/// Trait for reaching the managed host
///
/// Paths are tree-relative and forward-slash separated; implementations map
/// them under the host's configuration directory.
pub trait HostTransport: Send + Sync {
    /// Human-readable destination (e.g. `pi@ha.local:/config`)
    fn describe(&self) -> String;

    /// Absolute host-side path for a tree-relative path
    fn host_path(&self, relative: &str) -> String;

    /// List every file under the managed roots with its fingerprint
    fn list_manifest(&self, scope: &ManagedScope) -> Result<HostManifest, TransportError>;

    /// Create or replace one file, creating parent directories as needed
    fn upload(&self, path: &str, content: &[u8]) -> Result<(), TransportError>;

    /// Remove one file
    fn delete(&self, path: &str) -> Result<(), TransportError>;

    /// Run a shell command on the host. A non-zero exit is not an error here;
    /// callers inspect `CommandOutput`.
    fn execute(&self, command: &str, timeout: Duration) -> Result<CommandOutput, TransportError>;
}
