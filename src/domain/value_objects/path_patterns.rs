//! Path pattern value object
//!
//! A set of gitignore-style patterns matched against tree-relative paths.
//! Used for registry path markers and for source excludes.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{HapError, HapResult};

/// Maximum number of patterns in one set
const MAX_PATTERNS: usize = 1000;

#[derive(Debug, Clone)]
pub struct PathPatterns {
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl Default for PathPatterns {
    fn default() -> Self {
        Self::empty()
    }
}

impl PathPatterns {
    /// A pattern set that matches nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compile patterns. Blank lines and `#` comments are skipped.
    pub fn new<I, S>(patterns: I) -> HapResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new("");
        let mut kept = Vec::new();

        for pattern in patterns {
            let line = pattern.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if kept.len() == MAX_PATTERNS {
                return Err(HapError::InvalidPattern {
                    pattern: line.to_string(),
                    message: format!("more than {} patterns", MAX_PATTERNS),
                });
            }
            builder
                .add_line(None, line)
                .map_err(|e| HapError::InvalidPattern {
                    pattern: line.to_string(),
                    message: e.to_string(),
                })?;
            kept.push(line.to_string());
        }

        let matcher = builder.build().map_err(|e| HapError::InvalidPattern {
            pattern: kept.join(", "),
            message: e.to_string(),
        })?;

        Ok(Self {
            matcher,
            patterns: kept,
        })
    }

    /// Check whether a file at `path` (tree-relative) is matched, directly or
    /// through one of its parent directories.
    pub fn matches(&self, path: &str) -> bool {
        if self.patterns.is_empty() || path.is_empty() || path.starts_with('/') {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(Path::new(path), false)
            .is_ignore()
    }

    /// Same as [`matches`](Self::matches), for a directory
    pub fn matches_dir(&self, path: &str) -> bool {
        if self.patterns.is_empty() || path.is_empty() || path.starts_with('/') {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(Path::new(path), true)
            .is_ignore()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
