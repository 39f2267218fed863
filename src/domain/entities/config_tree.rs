//! ConfigTree entity - the snapshot being validated and deployed
//!
//! Built once per pipeline run and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::config_file::{ConfigFile, FileFormat};
use crate::domain::value_objects::Fingerprint;
use crate::error::{HapError, HapResult};

/// Ordered, path-unique collection of configuration files
#[derive(Debug, Clone)]
pub struct ConfigTree {
    root: PathBuf,
    files: BTreeMap<String, ConfigFile>,
    secrets_template: Option<String>,
}

impl ConfigTree {
    /// Build a tree from files. Paths must be unique.
    ///
    /// The file named by `secrets_template` (if present) is always parsed as
    /// YAML, whatever its extension.
    pub fn from_files<I>(
        root: impl Into<PathBuf>,
        files: I,
        secrets_template: Option<&str>,
    ) -> HapResult<Self>
    where
        I: IntoIterator<Item = ConfigFile>,
    {
        let mut map = BTreeMap::new();
        for file in files {
            let file = if Some(file.path()) == secrets_template {
                file.into_format(FileFormat::Yaml)
            } else {
                file
            };
            let path = file.path().to_string();
            if map.insert(path.clone(), file).is_some() {
                return Err(HapError::DuplicatePath { path });
            }
        }

        Ok(Self {
            root: root.into(),
            files: map,
            secrets_template: secrets_template.map(str::to_string),
        })
    }

    /// Local directory the tree was loaded from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&ConfigFile> {
        self.files.get(path)
    }

    /// Files in path order
    pub fn files(&self) -> impl Iterator<Item = &ConfigFile> {
        self.files.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Whether any file lives beneath `dir`
    pub fn contains_dir(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            return !self.files.is_empty();
        }
        let prefix = format!("{}/", dir);
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(path, _)| path.starts_with(&prefix))
    }

    /// Path of the secrets template, as configured
    pub fn secrets_template_path(&self) -> Option<&str> {
        self.secrets_template.as_deref()
    }

    /// The template file, if it exists in the tree
    pub fn secrets_template(&self) -> Option<&ConfigFile> {
        self.secrets_template.as_deref().and_then(|p| self.get(p))
    }

    /// Secret names declared by the template (top-level keys).
    ///
    /// Values are never read.
    pub fn declared_secrets(&self) -> BTreeSet<String> {
        self.secrets_template()
            .and_then(|f| f.document())
            .map(|doc| doc.top_level_keys().into_iter().collect())
            .unwrap_or_default()
    }

    /// Digest identifying this exact snapshot
    pub fn digest(&self) -> Fingerprint {
        Fingerprint::digest_of(
            self.files
                .iter()
                .map(|(path, file)| (path.as_str(), file.fingerprint())),
        )
    }
}
