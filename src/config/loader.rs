//! Configuration loading

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::services::closest_match;

use super::env_validator::EnvChoice;
use super::types::Config;

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "hapsync.toml";

/// Errors from reading or parsing `hapsync.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_warnings(&content, path)
}

/// Parse TOML text; `path` is only used for messages.
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: closest_match(&key, KNOWN_KEYS.iter().copied()),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Project config, then user config, then defaults; `HAPSYNC_*` applied last.
pub fn load_or_default(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let candidate = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(path.to_path_buf())
        }
        None => {
            let project_config = project_root.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                Some(project_config)
            } else {
                user_config_path().filter(|p| p.exists())
            }
        }
    };

    let (config, warnings) = match candidate {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            load_with_warnings(&path)?
        }
        None => {
            tracing::debug!("no configuration file, using defaults");
            (Config::default(), Vec::new())
        }
    };

    Ok((with_env_overrides(config), warnings))
}

/// `$XDG_CONFIG_HOME/hapsync/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("hapsync").join("config.toml"))
}

/// Apply environment variable overrides (HAPSYNC_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok(), &mut std::io::stderr())
}

/// Apply overrides from an arbitrary lookup; invalid values are reported to
/// `writer` and leave the setting unchanged.
pub fn apply_overrides<F, W>(mut config: Config, lookup: F, writer: &mut W) -> Config
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    if let Some(dest) = lookup("HAPSYNC_HOST") {
        config.host.destination = Some(dest);
    }

    if let Some(path) = lookup("HAPSYNC_HOST_PATH") {
        config.host.path = path;
    }

    if let Some(raw) = lookup("HAPSYNC_HOST_CHECK") {
        config.host_check.mode = EnvChoice::new("HAPSYNC_HOST_CHECK", &["auto", "required", "off"])
            .resolve(&raw, config.host_check.mode, writer);
    }

    if let Some(raw) = lookup("HAPSYNC_RELOAD") {
        config.reload.policy = EnvChoice::new("HAPSYNC_RELOAD", &["never", "on-change", "always"])
            .resolve(&raw, config.reload.policy, writer);
    }

    if let Some(raw) = lookup("HAPSYNC_UNKNOWN_KEYS") {
        config.validation.unknown_keys =
            EnvChoice::new("HAPSYNC_UNKNOWN_KEYS", &["ignore", "warn", "strict"])
                .resolve(&raw, config.validation.unknown_keys, writer);
    }

    if let Some(path) = lookup("HAPSYNC_AUDIT_PATH") {
        config.audit.path = PathBuf::from(path);
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

const KNOWN_KEYS: &[&str] = &[
    "source",
    "root",
    "secrets_template",
    "exclude",
    "host",
    "destination",
    "path",
    "managed_roots",
    "command_timeout_secs",
    "validation",
    "unknown_keys",
    "workers",
    "env_vars",
    "roles",
    "shape",
    "required_keys",
    "known_keys",
    "detect_hardcoded_secrets",
    "host_check",
    "mode",
    "command",
    "timeout_secs",
    "sync",
    "floor_timeout_secs",
    "per_file_timeout_secs",
    "reload",
    "policy",
    "health_command",
    "retries",
    "backoff_secs",
    "audit",
    "registry",
    "name",
    "classification",
    "description",
    "paths",
];
