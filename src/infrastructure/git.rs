//! Source revision lookup
//!
//! Best effort: a tree outside a git checkout, or a machine without `git`,
//! simply has no revision.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::infrastructure::process::run_with_timeout;

const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// `git rev-parse HEAD` for the checkout containing `dir`, with a `-dirty`
/// suffix when tracked files have uncommitted changes.
pub fn source_revision(dir: &Path) -> Option<String> {
    let head = git(dir, &["rev-parse", "HEAD"])?;
    let head = head.trim();
    if head.is_empty() {
        return None;
    }

    let dirty = git(dir, &["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|out| !out.trim().is_empty());

    Some(if dirty {
        format!("{}-dirty", head)
    } else {
        head.to_string()
    })
}

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(dir).args(args);
    match run_with_timeout(&mut cmd, "git", None, GIT_TIMEOUT) {
        Ok(out) if out.success() => Some(out.stdout),
        Ok(out) => {
            tracing::debug!(error = %out.failure_summary(), "git lookup failed");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "git unavailable");
            None
        }
    }
}
