//! SSH Host Transport
//!
//! Reaches the host through the system `ssh` binary. Each operation is one
//! `ssh` invocation; file content travels over stdin.

use std::process::Command;
use std::time::Duration;

use crate::domain::entities::HostManifest;
use crate::domain::ports::{CommandOutput, HostTransport, TransportError};
use crate::domain::value_objects::{Fingerprint, ManagedScope};
use crate::infrastructure::process::run_with_timeout;

use super::{is_internal, join_host, shell_quote};

/// `ssh` exits with 255 when it could not connect or authenticate
const SSH_CONNECTION_FAILURE: i32 = 255;

/// SSH transport to a remote host directory
pub struct SshTransport {
    /// SSH destination (user@host or host alias)
    destination: String,
    /// Configuration directory on the host
    base: String,
    /// Timeout for transport-level commands (list, upload, delete)
    command_timeout: Duration,
}

impl SshTransport {
    pub fn new(destination: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            base: base.into(),
            command_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    fn ssh_command(&self, remote: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.command_timeout.as_secs().max(1)
            ))
            .arg(&self.destination)
            .arg(remote);
        cmd
    }

    /// Run `remote` over ssh; a 255 exit becomes a connection error
    fn run(
        &self,
        remote: &str,
        input: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        tracing::debug!(destination = %self.destination, command = remote, "ssh");
        let output = run_with_timeout(&mut self.ssh_command(remote), remote, input, timeout)?;
        if output.status == Some(SSH_CONNECTION_FAILURE) {
            return Err(TransportError::Connection(format!(
                "ssh {}: {}",
                self.destination,
                output.failure_summary()
            )));
        }
        Ok(output)
    }

    /// Like `run`, but a non-zero exit is an error
    fn run_checked(&self, remote: &str, input: Option<&[u8]>) -> Result<String, TransportError> {
        let output = self.run(remote, input, self.command_timeout)?;
        if !output.success() {
            return Err(TransportError::CommandFailed {
                command: remote.to_string(),
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }

    /// Shell script printing `<hex>  <path>` for every file under the roots
    fn manifest_script(&self, scope: &ManagedScope) -> String {
        let mut script = String::from(
            "if command -v sha256sum >/dev/null 2>&1; then H='sha256sum'; else H='shasum -a 256'; fi\n",
        );
        script.push_str(&format!("cd {} || exit 1\n", shell_quote(&self.base)));
        for root in scope.roots() {
            let target = if root.is_empty() {
                ".".to_string()
            } else {
                shell_quote(root)
            };
            script.push_str(&format!(
                "[ -e {t} ] && find {t} -type f -exec $H {{}} + \n",
                t = target
            ));
        }
        script.push_str("exit 0\n");
        script
    }
}

/// Parse `sha256sum` output into a manifest restricted to `scope`
pub(crate) fn parse_manifest(output: &str, scope: &ManagedScope) -> HostManifest {
    let mut manifest = HostManifest::new();
    for line in output.lines() {
        let Some((hex, path)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        // sha256sum marks binary mode with a leading '*'
        let path = path.trim_start().trim_start_matches('*');
        let path = path.strip_prefix("./").unwrap_or(path);
        if path.is_empty() || is_internal(path) || !scope.contains(path) {
            continue;
        }
        manifest.insert(path, Fingerprint::new(hex));
    }
    manifest
}

impl HostTransport for SshTransport {
    fn describe(&self) -> String {
        format!("{}:{}", self.destination, self.base)
    }

    fn host_path(&self, relative: &str) -> String {
        join_host(&self.base, relative)
    }

    fn list_manifest(&self, scope: &ManagedScope) -> Result<HostManifest, TransportError> {
        let script = self.manifest_script(scope);
        let stdout = self.run_checked("sh -s", Some(script.as_bytes()))?;
        let manifest = parse_manifest(&stdout, scope);
        tracing::debug!(files = manifest.len(), "host manifest listed");
        Ok(manifest)
    }

    fn upload(&self, path: &str, content: &[u8]) -> Result<(), TransportError> {
        let target = self.host_path(path);
        let tmp = format!("{}.hapsync-tmp", target);
        let parent = match target.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => parent.to_string(),
            _ => ".".to_string(),
        };
        let remote = format!(
            "mkdir -p {parent} && cat > {tmp} && mv -f {tmp} {target}",
            parent = shell_quote(&parent),
            tmp = shell_quote(&tmp),
            target = shell_quote(&target),
        );
        self.run_checked(&remote, Some(content)).map(|_| ())
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        let remote = format!("rm -f {}", shell_quote(&self.host_path(path)));
        self.run_checked(&remote, None).map(|_| ())
    }

    fn execute(&self, command: &str, timeout: Duration) -> Result<CommandOutput, TransportError> {
        self.run(command, None, timeout)
    }
}
