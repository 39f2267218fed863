//! Command-driven Host Runtime
//!
//! Talks to the home-automation runtime by running configured shell
//! commands on the host through the transport.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{HostRuntime, HostTransport, RuntimeError};
use crate::infrastructure::transport::shell_quote;

pub const DEFAULT_CHECK_COMMAND: &str = "hass --script check_config --config {path}";
pub const DEFAULT_RELOAD_COMMAND: &str = "curl -fsS -X POST -H \"Authorization: Bearer $HASS_TOKEN\" http://localhost:8123/api/services/homeassistant/reload_all";
pub const DEFAULT_HEALTH_COMMAND: &str =
    "curl -fsS -H \"Authorization: Bearer $HASS_TOKEN\" http://localhost:8123/api/";

/// Runtime commands. `{path}` expands to the absolute host path of the
/// directory being checked, `{relpath}` to its tree-relative form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCommands {
    pub check: String,
    pub reload: String,
    pub health: String,
}

impl Default for RuntimeCommands {
    fn default() -> Self {
        Self {
            check: DEFAULT_CHECK_COMMAND.to_string(),
            reload: DEFAULT_RELOAD_COMMAND.to_string(),
            health: DEFAULT_HEALTH_COMMAND.to_string(),
        }
    }
}

pub struct CommandRuntime {
    transport: Arc<dyn HostTransport>,
    commands: RuntimeCommands,
    command_timeout: Duration,
}

impl CommandRuntime {
    pub fn new(transport: Arc<dyn HostTransport>, commands: RuntimeCommands) -> Self {
        Self {
            transport,
            commands,
            command_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn expand(&self, template: &str, relative: &str) -> String {
        template
            .replace("{path}", &shell_quote(&self.transport.host_path(relative)))
            .replace("{relpath}", &shell_quote(relative))
    }

    fn run(&self, command: &str, timeout: Duration) -> Result<(), RuntimeError> {
        let output = self.transport.execute(command, timeout)?;
        if output.success() {
            Ok(())
        } else {
            Err(RuntimeError::Rejected {
                details: output.failure_summary(),
            })
        }
    }
}

impl HostRuntime for CommandRuntime {
    fn check_config(&self, staged_dir: &str, timeout: Duration) -> Result<(), RuntimeError> {
        let command = self.expand(&self.commands.check, staged_dir);
        tracing::debug!(%command, "running configuration check");
        self.run(&command, timeout)
    }

    fn reload(&self) -> Result<(), RuntimeError> {
        self.run(&self.commands.reload, self.command_timeout)
    }

    fn health(&self) -> Result<(), RuntimeError> {
        self.run(&self.commands.health, self.command_timeout)
    }
}
