//! In-memory Host Transport
//!
//! A host that lives in a map. Records every call and can be told to fail,
//! which is what the pipeline tests need to observe halts and partial syncs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::entities::HostManifest;
use crate::domain::ports::{CommandOutput, HostTransport, TransportError};
use crate::domain::value_objects::{Fingerprint, ManagedScope};

use super::{is_internal, join_host};

/// One call made against a `MemoryTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    ListManifest,
    Upload(String),
    Delete(String),
    Execute(String),
}

impl TransportCall {
    /// Whether the call changes live host files (staging excluded)
    pub fn is_live_mutation(&self) -> bool {
        match self {
            TransportCall::Upload(path) | TransportCall::Delete(path) => !is_internal(path),
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryHost {
    files: BTreeMap<String, Vec<u8>>,
    calls: Vec<TransportCall>,
    unreachable: bool,
    /// Live mutations allowed before every further one fails
    mutations_left: Option<usize>,
    command_output: Option<CommandOutput>,
    /// Delay added to every upload, delete and command
    latency: Option<Duration>,
}

/// Cloneable in-memory host; clones share state
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    host: Arc<Mutex<MemoryHost>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a live file
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.lock().files.insert(path.to_string(), content.into());
        self
    }

    /// Every call fails with a connection error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Allow `n` more live uploads/deletes, then fail the rest
    pub fn fail_after(&self, n: usize) {
        self.lock().mutations_left = Some(n);
    }

    /// Stop injecting mutation failures
    pub fn heal(&self) {
        self.lock().mutations_left = None;
    }

    /// Output returned by `execute` (default: success, no output)
    pub fn set_command_output(&self, output: CommandOutput) {
        self.lock().command_output = Some(output);
    }

    /// Make the host slow; each call sleeps for `latency` first
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Live uploads and deletes made so far
    pub fn live_mutations(&self) -> Vec<TransportCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_live_mutation())
            .cloned()
            .collect()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    /// Live file paths (staging excluded)
    pub fn paths(&self) -> Vec<String> {
        self.lock()
            .files
            .keys()
            .filter(|p| !is_internal(p))
            .cloned()
            .collect()
    }

    fn lag(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryHost> {
        // A panicking test thread must not hide the host from the assertions
        self.host.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MemoryHost {
    fn reachable(&self) -> Result<(), TransportError> {
        if self.unreachable {
            return Err(TransportError::Connection("memory host unreachable".to_string()));
        }
        Ok(())
    }

    fn take_mutation(&mut self, path: &str) -> Result<(), TransportError> {
        if is_internal(path) {
            return Ok(());
        }
        match self.mutations_left {
            Some(0) => Err(TransportError::Io(format!("injected failure writing {}", path))),
            Some(ref mut n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl HostTransport for MemoryTransport {
    fn describe(&self) -> String {
        "memory:/config".to_string()
    }

    fn host_path(&self, relative: &str) -> String {
        join_host("/config", relative)
    }

    fn list_manifest(&self, scope: &ManagedScope) -> Result<HostManifest, TransportError> {
        let mut host = self.lock();
        host.calls.push(TransportCall::ListManifest);
        host.reachable()?;
        Ok(host
            .files
            .iter()
            .filter(|(path, _)| !is_internal(path) && scope.contains(path))
            .map(|(path, content)| (path.clone(), Fingerprint::from_bytes(content)))
            .collect())
    }

    fn upload(&self, path: &str, content: &[u8]) -> Result<(), TransportError> {
        self.lag();
        let mut host = self.lock();
        host.calls.push(TransportCall::Upload(path.to_string()));
        host.reachable()?;
        host.take_mutation(path)?;
        host.files.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.lag();
        let mut host = self.lock();
        host.calls.push(TransportCall::Delete(path.to_string()));
        host.reachable()?;
        host.take_mutation(path)?;
        host.files.remove(path);
        Ok(())
    }

    fn execute(&self, command: &str, _timeout: Duration) -> Result<CommandOutput, TransportError> {
        self.lag();
        let mut host = self.lock();
        host.calls.push(TransportCall::Execute(command.to_string()));
        host.reachable()?;
        Ok(host.command_output.clone().unwrap_or(CommandOutput {
            status: Some(0),
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = MemoryTransport::new();
        let b = a.clone();
        a.upload("scripts.yaml", b"{}").unwrap();
        assert_eq!(b.file("scripts.yaml"), Some(b"{}".to_vec()));
    }

    #[test]
    fn fail_after_counts_live_mutations_only() {
        let t = MemoryTransport::new();
        t.fail_after(1);
        t.upload(".hapsync-staging/run/a.yaml", b"x").unwrap();
        t.upload("a.yaml", b"x").unwrap();
        assert!(t.upload("b.yaml", b"x").is_err());
        assert_eq!(t.paths(), vec!["a.yaml".to_string()]);
        assert_eq!(t.live_mutations().len(), 2);
    }

    #[test]
    fn unreachable_host_errors() {
        let t = MemoryTransport::new();
        t.set_unreachable(true);
        assert!(t
            .list_manifest(&ManagedScope::everything())
            .unwrap_err()
            .is_unreachable());
    }
}
