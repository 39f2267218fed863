//! References and source locations
//!
//! A reference is a YAML tag that points outside the file it appears in:
//! `!secret`, `!include`, the `!include_dir_*` family and `!env_var`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where inside a file something was found.
///
/// Ordering is by line, then column, then key path, so reports sort in
/// reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub key_path: String,
}

impl Location {
    pub fn file_level() -> Self {
        Self::default()
    }

    pub fn at_key(key_path: impl Into<String>) -> Self {
        Self {
            line: None,
            column: None,
            key_path: key_path.into(),
        }
    }

    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
            .then_with(|| self.key_path.cmp(&other.key_path))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{}:{}", line, col)?,
            (Some(line), None) => write!(f, "{}", line)?,
            _ => {}
        }
        if !self.key_path.is_empty() {
            if self.line.is_some() {
                write!(f, " ")?;
            }
            write!(f, "({})", self.key_path)?;
        }
        Ok(())
    }
}

/// How an `!include_dir_*` tag merges the directory it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeDirMode {
    List,
    Named,
    MergeList,
    MergeNamed,
}

/// What a reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `!secret name` - value lives in the host's secrets file
    Secret,
    /// `!include path` - another file in the tree
    Include,
    /// `!include_dir_* path` - a directory in the tree
    IncludeDir(IncludeDirMode),
    /// `!env_var NAME [default]` - host process environment
    EnvVar { has_default: bool },
}

impl ReferenceKind {
    /// Map a YAML tag (with or without leading `!`) to a reference kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim_start_matches('!') {
            "secret" => Some(Self::Secret),
            "include" => Some(Self::Include),
            "include_dir_list" => Some(Self::IncludeDir(IncludeDirMode::List)),
            "include_dir_named" => Some(Self::IncludeDir(IncludeDirMode::Named)),
            "include_dir_merge_list" => Some(Self::IncludeDir(IncludeDirMode::MergeList)),
            "include_dir_merge_named" => Some(Self::IncludeDir(IncludeDirMode::MergeNamed)),
            "env_var" => Some(Self::EnvVar { has_default: false }),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Secret => "!secret",
            Self::Include => "!include",
            Self::IncludeDir(IncludeDirMode::List) => "!include_dir_list",
            Self::IncludeDir(IncludeDirMode::Named) => "!include_dir_named",
            Self::IncludeDir(IncludeDirMode::MergeList) => "!include_dir_merge_list",
            Self::IncludeDir(IncludeDirMode::MergeNamed) => "!include_dir_merge_named",
            Self::EnvVar { .. } => "!env_var",
        }
    }

    /// Secret placeholders are resolved by name only; the value is never in the tree.
    pub fn is_secret_placeholder(&self) -> bool {
        matches!(self, Self::Secret)
    }
}

/// A named pointer from one file to a definition elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Secret name, include path or environment variable name
    pub target: String,
    pub location: Location,
}

impl Reference {
    pub fn new(kind: ReferenceKind, target: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            target: target.into(),
            location,
        }
    }
}
