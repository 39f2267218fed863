//! Child process execution with a hard timeout
//!
//! Every command hapsync runs against a host (an `ssh` invocation or a local
//! `sh -c`) goes through `run_with_timeout`, so nothing can hang a run.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::domain::ports::{CommandOutput, TransportError};

/// Spawn `command`, feed it `input`, and wait at most `timeout`.
///
/// `label` names the command in errors. On timeout the child is killed and
/// `TransportError::Timeout` is returned.
pub fn run_with_timeout(
    command: &mut Command,
    label: &str,
    input: Option<&[u8]>,
    timeout: Duration,
) -> Result<CommandOutput, TransportError> {
    let mut child = command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TransportError::Connection(format!("failed to spawn '{}': {}", label, e)))?;

    // Drain the pipes on their own threads so a chatty child cannot block
    // on a full pipe while we wait on it.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
        if let Err(err) = stdin.write_all(data) {
            tracing::debug!(error = %err, command = label, "child closed stdin early");
        }
    }

    let status = match child
        .wait_timeout(timeout)
        .map_err(|e| TransportError::Io(e.to_string()))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TransportError::Timeout {
                command: label.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    Ok(CommandOutput {
        status: status.code(),
        stdout: stdout.map(join).unwrap_or_default(),
        stderr: stderr.map(join).unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
