//! Tree paths and the managed-root allowlist
//!
//! Every path inside a `ConfigTree` or a `HostManifest` is a normalized,
//! forward-slash, root-relative string. `ManagedScope` decides which of those
//! paths the synchronizer is allowed to touch on the host.

use std::path::{Component, Path};

use crate::error::{HapError, HapResult};

/// Normalize a relative path for tree storage (always forward slashes, no `./`).
pub fn normalize_tree_path(path: &Path) -> String {
    let joined = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    joined.replace('\\', "/")
}

/// Resolve `target` relative to the directory containing `from`.
///
/// Returns `None` when the result would escape the tree root.
pub fn resolve_relative(from: &str, target: &str) -> Option<String> {
    let mut parts: Vec<&str> = from.split('/').collect();
    parts.pop();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}

/// Path-prefix allowlist for host-side operations.
///
/// A root ending in `/` (or naming a directory) covers everything beneath it;
/// a root naming a file covers exactly that file. An empty root covers the
/// whole host directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedScope {
    roots: Vec<String>,
}

impl ManagedScope {
    pub fn new<I, S>(roots: I) -> HapResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for root in roots {
            let raw = root.as_ref();
            if raw.starts_with('/') || raw.split('/').any(|s| s == "..") {
                return Err(HapError::InvalidPattern {
                    pattern: raw.to_string(),
                    message: "managed roots must be relative and stay inside the host directory"
                        .to_string(),
                });
            }
            let trimmed = raw.trim_start_matches("./").trim_end_matches('/');
            let trimmed = if trimmed == "." { "" } else { trimmed };
            normalized.push(trimmed.to_string());
        }
        normalized.sort();
        normalized.dedup();
        Ok(Self { roots: normalized })
    }

    /// Scope covering the entire host directory
    pub fn everything() -> Self {
        Self {
            roots: vec![String::new()],
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Check whether `path` lies inside one of the managed roots
    pub fn contains(&self, path: &str) -> bool {
        self.roots.iter().any(|root| {
            root.is_empty()
                || path == root
                || path
                    .strip_prefix(root.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
