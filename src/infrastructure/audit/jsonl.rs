//! JSON Lines Audit Log
//!
//! One `DeploymentResult` per line, appended under an exclusive advisory
//! lock so concurrent runs against the same log never interleave.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::entities::DeploymentResult;
use crate::domain::ports::{AuditError, AuditLog};

/// Default location, relative to the project root
pub const DEFAULT_AUDIT_PATH: &str = ".hapsync/deployments.jsonl";

pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn lock(&self) -> Result<File, AuditError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_file = File::create(&lock_path)?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }
}

impl AuditLog for JsonlAuditLog {
    fn append(&self, result: &DeploymentResult) -> Result<(), AuditError> {
        let line =
            serde_json::to_string(result).map_err(|e| AuditError::Encode(e.to_string()))?;

        let lock_file = self.lock()?;
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                writeln!(file, "{}", line)?;
                file.sync_data()
            });
        let _ = lock_file.unlock();

        written?;
        tracing::debug!(path = %self.path.display(), id = %result.id(), "deployment recorded");
        Ok(())
    }

    fn entries(&self) -> Result<Vec<DeploymentResult>, AuditError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| AuditError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
