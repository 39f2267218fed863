//! Source Tree Loader
//!
//! Reads the local configuration directory into a `ConfigTree`.
//! Walks with the `ignore` crate so `.gitignore` and `.hapsyncignore`
//! files are honoured, then applies the configured exclude patterns.

use std::fs;
use std::path::Path;

use crate::domain::entities::{ConfigFile, ConfigTree};
use crate::domain::value_objects::{normalize_tree_path, PathPatterns};
use crate::error::{HapError, HapResult};

/// Per-directory ignore file, gitignore syntax
pub const IGNORE_FILE: &str = ".hapsyncignore";

/// Never part of a tree, whatever the configuration says
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git/",
    ".hapsync/",
    "secrets.yaml",
    "*.swp",
    "*~",
    ".DS_Store",
    IGNORE_FILE,
    "hapsync.toml",
];

#[derive(Debug, Clone, Default)]
pub struct TreeLoadOptions {
    /// Extra exclude patterns, on top of `DEFAULT_EXCLUDES`
    pub exclude: Vec<String>,
    /// Tree-relative path of the secrets template
    pub secrets_template: Option<String>,
}

/// Load every file under `root` into a tree
pub fn load_tree(root: &Path, options: &TreeLoadOptions) -> HapResult<ConfigTree> {
    if !root.is_dir() {
        return Err(HapError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let excludes = PathPatterns::new(
        DEFAULT_EXCLUDES
            .iter()
            .copied()
            .chain(options.exclude.iter().map(String::as_str)),
    )?;

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .git_ignore(true)
        .add_custom_ignore_filename(IGNORE_FILE)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = normalize_tree_path(relative);
        if excludes.matches(&relative) {
            tracing::trace!(path = %relative, "excluded");
            continue;
        }
        let content = fs::read(entry.path())?;
        files.push(ConfigFile::new(relative, content));
    }

    let tree = ConfigTree::from_files(root, files, options.secrets_template.as_deref())?;
    tracing::debug!(root = %root.display(), files = tree.len(), "tree loaded");
    Ok(tree)
}
