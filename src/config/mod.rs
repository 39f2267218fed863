//! Configuration module for hapsync
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (HAPSYNC_*)
//! 3. Project config (`hapsync.toml`)
//! 4. User config (`~/.config/hapsync/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod env_validator;
mod loader;
mod types;

pub use env_validator::EnvChoice;
pub use loader::{
    apply_overrides, parse_with_warnings, user_config_path, with_env_overrides, ConfigError,
    ConfigWarning, PROJECT_CONFIG_FILE,
};
pub use types::{
    AuditConfig, Config, HostCheckConfig, HostConfig, ReloadConfig, SourceConfig, SyncConfig,
    ValidationConfig,
};
