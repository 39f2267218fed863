//! Schema and reference validation
//!
//! Checks a whole `ConfigTree` without touching the host. Every check runs on
//! every file; problems are returned as data in a `ValidationReport`, never
//! as `Err`. A file that fails to parse produces exactly one `Malformed`
//! error and is not checked further.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::suggest::closest_match;
use crate::domain::entities::{
    find_key_line, ConfigFile, ConfigTree, Location, ParseState, ReferenceKind, Shape,
    StateRegistry,
};
use crate::domain::value_objects::{resolve_relative, ManagedScope};

/// Category of a blocking problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Malformed,
    SchemaViolation,
    UnresolvedReference,
    MisplacedState,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::SchemaViolation => "schema violation",
            Self::UnresolvedReference => "unresolved reference",
            Self::MisplacedState => "misplaced state",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub file: String,
    pub location: Location,
    pub kind: ValidationErrorKind,
    pub message: String,
}

/// Category of a non-blocking finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnknownKey,
    HardcodedSecret,
    OutsideManagedRoots,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownKey => "unknown key",
            Self::HardcodedSecret => "hardcoded secret",
            Self::OutsideManagedRoots => "outside managed roots",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub file: String,
    pub location: Location,
    pub kind: WarningKind,
    pub message: String,
}

/// Outcome of validating a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    files_checked: usize,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn files_checked(&self) -> usize {
        self.files_checked
    }

    /// Errors ordered by (file, location, kind)
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn errors_of(&self, kind: ValidationErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

/// What a file at a given path must look like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRole {
    pub path: String,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub required_keys: Vec<String>,
    /// Top-level keys that are expected. `None` tolerates everything.
    #[serde(default)]
    pub known_keys: Option<Vec<String>>,
}

impl FileRole {
    pub fn new(path: impl Into<String>, shape: Shape) -> Self {
        Self {
            path: path.into(),
            shape: Some(shape),
            required_keys: Vec::new(),
            known_keys: None,
        }
    }

    pub fn requiring<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn knowing<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Roles for the standard home-automation layout
    pub fn defaults() -> Vec<FileRole> {
        vec![
            FileRole::new("configuration.yaml", Shape::Mapping).requiring(["homeassistant"]),
            FileRole::new("automations.yaml", Shape::Sequence),
            FileRole::new("scripts.yaml", Shape::Mapping),
            FileRole::new("scenes.yaml", Shape::Sequence),
            FileRole::new("customize.yaml", Shape::Mapping),
            FileRole::new("groups.yaml", Shape::Mapping),
        ]
    }
}

/// How top-level keys outside a role's `known_keys` are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    Ignore,
    #[default]
    Warn,
    Strict,
}

impl std::str::FromStr for UnknownKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(UnknownKeyPolicy::Ignore),
            "warn" => Ok(UnknownKeyPolicy::Warn),
            "strict" => Ok(UnknownKeyPolicy::Strict),
            other => Err(format!("unknown key policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub roles: Vec<FileRole>,
    pub unknown_keys: UnknownKeyPolicy,
    /// Environment variables the host is known to define
    pub env_vars: BTreeSet<String>,
    /// Worker threads for per-file checks
    pub workers: usize,
    /// Files outside this scope are reported as warnings
    pub scope: ManagedScope,
    pub detect_hardcoded_secrets: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            roles: FileRole::defaults(),
            unknown_keys: UnknownKeyPolicy::default(),
            env_vars: BTreeSet::new(),
            workers: default_workers(),
            scope: ManagedScope::everything(),
            detect_hardcoded_secrets: true,
        }
    }
}

/// Available parallelism, capped at 8
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8)
}

/// Validate every file of `tree`.
pub fn validate(
    tree: &ConfigTree,
    registry: &StateRegistry,
    options: &ValidationOptions,
) -> ValidationReport {
    let context = CheckContext {
        tree,
        registry,
        options,
        declared_secrets: tree.declared_secrets(),
    };

    let files: Vec<&ConfigFile> = tree.files().collect();
    let workers = options.workers.max(1).min(files.len().max(1));
    let chunk_size = files.len().div_ceil(workers).max(1);

    let findings: Vec<Findings> = std::thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                let context = &context;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|file| context.check_file(file))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(findings) => findings,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for f in findings {
        errors.extend(f.errors);
        warnings.extend(f.warnings);
    }

    errors.sort_by(|a, b| {
        (&a.file, &a.location, a.kind, &a.message).cmp(&(&b.file, &b.location, b.kind, &b.message))
    });
    warnings.sort_by(|a, b| {
        (&a.file, &a.location, a.kind, &a.message).cmp(&(&b.file, &b.location, b.kind, &b.message))
    });

    tracing::debug!(
        files = files.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "validation finished"
    );

    ValidationReport {
        files_checked: files.len(),
        errors,
        warnings,
    }
}

#[derive(Default)]
struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn error(
        &mut self,
        file: &ConfigFile,
        location: Location,
        kind: ValidationErrorKind,
        message: String,
    ) {
        self.errors.push(ValidationError {
            file: file.path().to_string(),
            location,
            kind,
            message,
        });
    }

    fn warning(&mut self, file: &ConfigFile, location: Location, kind: WarningKind, message: String) {
        self.warnings.push(ValidationWarning {
            file: file.path().to_string(),
            location,
            kind,
            message,
        });
    }
}

struct CheckContext<'a> {
    tree: &'a ConfigTree,
    registry: &'a StateRegistry,
    options: &'a ValidationOptions,
    declared_secrets: BTreeSet<String>,
}

impl CheckContext<'_> {
    fn check_file(&self, file: &ConfigFile) -> Findings {
        let mut findings = Findings::default();

        if let ParseState::Malformed(failure) = file.parse_state() {
            findings.error(
                file,
                Location::file_level()
                    .with_line(failure.line)
                    .with_column(failure.column),
                ValidationErrorKind::Malformed,
                failure.message.clone(),
            );
            return findings;
        }

        self.check_schema(file, &mut findings);
        self.check_references(file, &mut findings);
        if self.options.detect_hardcoded_secrets {
            self.check_hardcoded_secrets(file, &mut findings);
        }
        self.check_classification(file, &mut findings);

        if !self.options.scope.contains(file.path()) {
            findings.warning(
                file,
                Location::file_level(),
                WarningKind::OutsideManagedRoots,
                "not under any managed root; it will not be synced".to_string(),
            );
        }

        findings
    }

    fn check_schema(&self, file: &ConfigFile, findings: &mut Findings) {
        let Some(role) = self.options.roles.iter().find(|r| r.path == file.path()) else {
            return;
        };
        let Some(document) = file.document() else {
            return;
        };
        let text = file.text().unwrap_or_default();

        let actual = document.shape();
        if let Some(expected) = role.shape {
            if actual != expected && actual != Shape::Empty {
                findings.error(
                    file,
                    Location::file_level().with_line(Some(1)),
                    ValidationErrorKind::SchemaViolation,
                    format!("expected a {} at the top level, found a {}", expected, actual),
                );
                return;
            }
        }

        let keys = document.top_level_keys();
        for required in &role.required_keys {
            if !keys.iter().any(|k| k == required) {
                findings.error(
                    file,
                    Location::file_level(),
                    ValidationErrorKind::SchemaViolation,
                    format!("missing required top-level key '{}'", required),
                );
            }
        }

        let Some(known) = &role.known_keys else {
            return;
        };
        if self.options.unknown_keys == UnknownKeyPolicy::Ignore {
            return;
        }
        let accepted: BTreeSet<&str> = known
            .iter()
            .chain(role.required_keys.iter())
            .map(String::as_str)
            .collect();

        for key in keys.iter().filter(|k| !accepted.contains(k.as_str())) {
            let location = Location::at_key(key.clone()).with_line(find_key_line(text, key));
            let mut message = format!("unknown top-level key '{}'", key);
            if let Some(suggestion) = closest_match(key, accepted.iter().copied()) {
                message.push_str(&format!(" (did you mean '{}'?)", suggestion));
            }

            match self.options.unknown_keys {
                UnknownKeyPolicy::Strict => findings.error(
                    file,
                    location,
                    ValidationErrorKind::SchemaViolation,
                    message,
                ),
                _ => findings.warning(file, location, WarningKind::UnknownKey, message),
            }
        }
    }

    fn check_references(&self, file: &ConfigFile, findings: &mut Findings) {
        for reference in file.references() {
            let problem = match &reference.kind {
                ReferenceKind::Secret => self.check_secret(&reference.target),
                ReferenceKind::Include => match resolve_relative(file.path(), &reference.target) {
                    None => Some(format!(
                        "include '{}' points outside the configuration tree",
                        reference.target
                    )),
                    Some(path) if !self.tree.contains_file(&path) => {
                        Some(format!("included file '{}' does not exist", path))
                    }
                    Some(_) => None,
                },
                ReferenceKind::IncludeDir(_) => {
                    match resolve_relative(file.path(), &reference.target) {
                        None => Some(format!(
                            "{} '{}' points outside the configuration tree",
                            reference.kind.tag(),
                            reference.target
                        )),
                        Some(dir) if !self.tree.contains_dir(&dir) => Some(format!(
                            "included directory '{}' does not exist or is empty",
                            dir
                        )),
                        Some(_) => None,
                    }
                }
                ReferenceKind::EnvVar { has_default } => {
                    if reference.target.is_empty() {
                        Some("!env_var without a variable name".to_string())
                    } else if !has_default && !self.options.env_vars.contains(&reference.target) {
                        Some(format!(
                            "environment variable '{}' has no default and is not in the allowlist",
                            reference.target
                        ))
                    } else {
                        None
                    }
                }
            };

            if let Some(message) = problem {
                findings.error(
                    file,
                    reference.location.clone(),
                    ValidationErrorKind::UnresolvedReference,
                    message,
                );
            }
        }
    }

    fn check_secret(&self, name: &str) -> Option<String> {
        if self.declared_secrets.contains(name) {
            return None;
        }
        match self.tree.secrets_template_path() {
            Some(template) if self.tree.secrets_template().is_some() => Some(format!(
                "secret '{}' is not declared in {}",
                name, template
            )),
            Some(template) => Some(format!(
                "secret '{}' cannot be resolved: secrets template {} is missing",
                name, template
            )),
            None => Some(format!(
                "secret '{}' cannot be resolved: no secrets template configured",
                name
            )),
        }
    }

    fn check_hardcoded_secrets(&self, file: &ConfigFile, findings: &mut Findings) {
        if self.tree.secrets_template_path() == Some(file.path()) {
            return;
        }
        let Some(document) = file.document() else {
            return;
        };
        let text = file.text().unwrap_or_default();

        for (key_path, key, value) in document.plain_values_for(&["password", "api_key", "token"])
        {
            let label = match key.as_str() {
                "password" if !value.trim().is_empty() => "password",
                "api_key" if looks_like_credential(&value, 20, false) => "API key",
                "token" if looks_like_credential(&value, 30, true) => "token",
                _ => continue,
            };
            findings.warning(
                file,
                Location::at_key(key_path).with_line(find_key_line(text, &key)),
                WarningKind::HardcodedSecret,
                format!("possible hardcoded {}; use !secret instead", label),
            );
        }
    }

    fn check_classification(&self, file: &ConfigFile, findings: &mut Findings) {
        if let Some(entity) = self.registry.opaque_match(file.path()) {
            findings.error(
                file,
                Location::file_level(),
                ValidationErrorKind::MisplacedState,
                format!(
                    "runtime state ({}) cannot be restored from the tree and must not be committed",
                    entity.name
                ),
            );
        }
    }
}

/// A run of at least `min_len` credential-like characters
fn looks_like_credential(value: &str, min_len: usize, allow_dots: bool) -> bool {
    let value = value.trim();
    value.len() >= min_len
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-' || (allow_dots && c == '.')
        })
}
