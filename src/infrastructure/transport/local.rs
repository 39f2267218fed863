//! Local Host Transport
//!
//! The host's configuration directory is on this machine (the runtime runs
//! here, or the directory is a mounted share).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::domain::entities::HostManifest;
use crate::domain::ports::{CommandOutput, HostTransport, TransportError};
use crate::domain::value_objects::{normalize_tree_path, Fingerprint, ManagedScope};
use crate::infrastructure::process::run_with_timeout;

use super::is_internal;

pub struct LocalTransport {
    base: PathBuf,
}

impl LocalTransport {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.base.join(relative.trim_start_matches('/'))
    }

    /// A missing base directory is an unreachable host, never created on demand
    fn ensure_base(&self) -> Result<(), TransportError> {
        if self.base.is_dir() {
            Ok(())
        } else {
            Err(TransportError::Connection(format!(
                "host directory {} does not exist",
                self.base.display()
            )))
        }
    }
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> TransportError {
    TransportError::Io(format!("{}: {}", path.display(), err))
}

impl HostTransport for LocalTransport {
    fn describe(&self) -> String {
        self.base.display().to_string()
    }

    fn host_path(&self, relative: &str) -> String {
        self.resolve(relative).display().to_string()
    }

    fn list_manifest(&self, scope: &ManagedScope) -> Result<HostManifest, TransportError> {
        self.ensure_base()?;
        let mut manifest = HostManifest::new();

        let walker = ignore::WalkBuilder::new(&self.base)
            .standard_filters(false)
            .hidden(false)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| TransportError::Io(e.to_string()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.base) else {
                continue;
            };
            let relative = normalize_tree_path(relative);
            if is_internal(&relative) || !scope.contains(&relative) {
                continue;
            }
            let content = fs::read(entry.path()).map_err(|e| io_error(entry.path(), e))?;
            manifest.insert(relative, Fingerprint::from_bytes(&content));
        }
        Ok(manifest)
    }

    fn upload(&self, path: &str, content: &[u8]) -> Result<(), TransportError> {
        self.ensure_base()?;
        let target = self.resolve(path);
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base.clone());
        fs::create_dir_all(&parent).map_err(|e| io_error(&parent, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| io_error(&parent, e))?;
        tmp.write_all(content).map_err(|e| io_error(&target, e))?;
        tmp.persist(&target).map_err(|e| io_error(&target, e.error))?;
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.ensure_base()?;
        let target = self.resolve(path);
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&target, e)),
        }
    }

    fn execute(&self, command: &str, timeout: Duration) -> Result<CommandOutput, TransportError> {
        self.ensure_base()?;
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(&self.base);
        run_with_timeout(&mut cmd, command, None, timeout)
    }
}
