//! Configuration type definitions

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{
    CheckOptions, DeployOptions, HealthPolicy, HostCheckMode, ReloadPolicy, SyncBudget,
};
use crate::domain::entities::{EntityDefinition, StateRegistry};
use crate::domain::services::{default_workers, FileRole, UnknownKeyPolicy, ValidationOptions};
use crate::domain::value_objects::ManagedScope;
use crate::error::HapResult;
use crate::infrastructure::audit::DEFAULT_AUDIT_PATH;
use crate::infrastructure::runtime::{
    RuntimeCommands, DEFAULT_CHECK_COMMAND, DEFAULT_HEALTH_COMMAND, DEFAULT_RELOAD_COMMAND,
};
use crate::infrastructure::TreeLoadOptions;

use super::loader::{self, ConfigError, ConfigWarning};

/// Where the configuration tree lives locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_root")]
    pub root: PathBuf,

    /// Committed template declaring secret names (e.g. `secrets.yaml.example`)
    #[serde(default)]
    pub secrets_template: Option<String>,

    /// Extra gitignore-style exclusions on top of the built-in ones
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: default_source_root(),
            secrets_template: None,
            exclude: Vec::new(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

/// The host the tree is deployed to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// `ssh` destination (`user@host`). Unset or `local` means `path` is a
    /// directory on this machine.
    #[serde(default)]
    pub destination: Option<String>,

    /// Configuration directory on the host
    #[serde(default = "default_host_path")]
    pub path: String,

    /// Roots the synchronizer may touch; empty means the paths of the
    /// registry's managed entities
    #[serde(default)]
    pub managed_roots: Vec<String>,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            destination: None,
            path: default_host_path(),
            managed_roots: Vec::new(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl HostConfig {
    /// `ssh` destination, or `None` for a local directory host
    pub fn ssh_destination(&self) -> Option<&str> {
        match self.destination.as_deref().map(str::trim) {
            None | Some("") | Some("local") => None,
            Some(dest) => Some(dest),
        }
    }
}

fn default_host_path() -> String {
    "/config".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

/// Local validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub unknown_keys: UnknownKeyPolicy,

    /// Worker threads; defaults to available parallelism capped at 8
    #[serde(default)]
    pub workers: Option<usize>,

    /// Environment variables the host defines, for `!env_var` references
    #[serde(default)]
    pub env_vars: Vec<String>,

    /// Roles replacing (same path) or extending the built-in ones
    #[serde(default)]
    pub roles: Vec<FileRole>,

    #[serde(default = "default_true")]
    pub detect_hardcoded_secrets: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::default(),
            workers: None,
            env_vars: Vec::new(),
            roles: Vec::new(),
            detect_hardcoded_secrets: true,
        }
    }
}

impl ValidationConfig {
    /// Built-in roles with the configured ones merged in
    pub fn effective_roles(&self) -> Vec<FileRole> {
        let mut roles: Vec<FileRole> = FileRole::defaults()
            .into_iter()
            .filter(|builtin| !self.roles.iter().any(|r| r.path == builtin.path))
            .collect();
        roles.extend(self.roles.iter().cloned());
        roles
    }
}

/// Dry-run host check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCheckConfig {
    #[serde(default)]
    pub mode: HostCheckMode,

    /// Check command; `{path}` expands to the staged directory
    #[serde(default = "default_check_command")]
    pub command: String,

    #[serde(default = "default_host_check_timeout")]
    pub timeout_secs: u64,
}

impl Default for HostCheckConfig {
    fn default() -> Self {
        Self {
            mode: HostCheckMode::default(),
            command: default_check_command(),
            timeout_secs: default_host_check_timeout(),
        }
    }
}

fn default_check_command() -> String {
    DEFAULT_CHECK_COMMAND.to_string()
}

fn default_host_check_timeout() -> u64 {
    60
}

/// Sync timeout budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_floor_timeout")]
    pub floor_timeout_secs: u64,

    #[serde(default = "default_per_file_timeout")]
    pub per_file_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            floor_timeout_secs: default_floor_timeout(),
            per_file_timeout_secs: default_per_file_timeout(),
        }
    }
}

fn default_floor_timeout() -> u64 {
    120
}

fn default_per_file_timeout() -> u64 {
    5
}

/// Reload and health polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    #[serde(default)]
    pub policy: ReloadPolicy,

    #[serde(default = "default_reload_command")]
    pub command: String,

    #[serde(default = "default_health_command")]
    pub health_command: String,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            policy: ReloadPolicy::default(),
            command: default_reload_command(),
            health_command: default_health_command(),
            retries: default_retries(),
            backoff_secs: default_backoff(),
        }
    }
}

fn default_reload_command() -> String {
    DEFAULT_RELOAD_COMMAND.to_string()
}

fn default_health_command() -> String {
    DEFAULT_HEALTH_COMMAND.to_string()
}

fn default_retries() -> u32 {
    10
}

fn default_backoff() -> u64 {
    3
}

/// Audit log location, relative to the project root unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

fn default_audit_path() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIT_PATH)
}

fn default_true() -> bool {
    true
}

/// Main configuration structure (`hapsync.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub host_check: HostCheckConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    /// Entities added to the built-in registry
    #[serde(default)]
    pub registry: Vec<EntityDefinition>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and collect unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Load from the project, the user config dir, or defaults, then apply
    /// `HAPSYNC_*` overrides. An explicit path must exist.
    pub fn load_or_default(
        project_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_or_default(project_root, explicit)
    }

    /// Configured roots, or the registry's managed paths when none are set
    pub fn managed_scope(&self) -> HapResult<ManagedScope> {
        if self.host.managed_roots.is_empty() {
            self.state_registry()?.managed_scope()
        } else {
            ManagedScope::new(&self.host.managed_roots)
        }
    }

    /// Built-in registry extended with `[[registry]]` entries
    pub fn state_registry(&self) -> HapResult<StateRegistry> {
        StateRegistry::builtin().extended(self.registry.iter().cloned())
    }

    pub fn validation_options(&self) -> HapResult<ValidationOptions> {
        Ok(ValidationOptions {
            roles: self.validation.effective_roles(),
            unknown_keys: self.validation.unknown_keys,
            env_vars: self.validation.env_vars.iter().cloned().collect::<BTreeSet<_>>(),
            workers: self.validation.workers.unwrap_or_else(default_workers),
            scope: self.managed_scope()?,
            detect_hardcoded_secrets: self.validation.detect_hardcoded_secrets,
        })
    }

    pub fn tree_load_options(&self) -> TreeLoadOptions {
        TreeLoadOptions {
            exclude: self.source.exclude.clone(),
            secrets_template: self.source.secrets_template.clone(),
        }
    }

    pub fn runtime_commands(&self) -> RuntimeCommands {
        RuntimeCommands {
            check: self.host_check.command.clone(),
            reload: self.reload.command.clone(),
            health: self.reload.health_command.clone(),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.host.command_timeout_secs)
    }

    pub fn check_options(&self) -> HapResult<CheckOptions> {
        Ok(CheckOptions {
            validation: self.validation_options()?,
            host_check: self.host_check.mode,
            host_check_timeout: Duration::from_secs(self.host_check.timeout_secs),
            command_timeout: self.command_timeout(),
        })
    }

    pub fn deploy_options(&self) -> HapResult<DeployOptions> {
        Ok(DeployOptions::new(self.managed_scope()?)
            .with_validation(self.validation_options()?)
            .with_host_check(self.host_check.mode)
            .with_host_check_timeout(Duration::from_secs(self.host_check.timeout_secs))
            .with_command_timeout(self.command_timeout())
            .with_sync_budget(SyncBudget {
                floor: Duration::from_secs(self.sync.floor_timeout_secs),
                per_operation: Duration::from_secs(self.sync.per_file_timeout_secs),
            })
            .with_reload_policy(self.reload.policy)
            .with_health(HealthPolicy {
                retries: self.reload.retries,
                backoff: Duration::from_secs(self.reload.backoff_secs),
            }))
    }

    /// Source root resolved against the project root
    pub fn source_root(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.source.root)
    }

    /// Audit log path resolved against the project root
    pub fn audit_path(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.audit.path)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
