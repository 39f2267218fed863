//! Per-invocation wiring
//!
//! Loads configuration once and builds the infrastructure each command
//! needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use hapsync::config::Config;
use hapsync::domain::entities::{ConfigTree, StateRegistry};
use hapsync::domain::ports::{HostRuntime, HostTransport};
use hapsync::infrastructure::{
    load_tree, CommandRuntime, JsonlAuditLog, LocalTransport, SshTransport,
};

use crate::cli::Cli;
use crate::ui::context::UiContext;

pub struct Session {
    pub project_root: PathBuf,
    pub config: Config,
    pub ui: UiContext,
    source_override: Option<PathBuf>,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let project_root = match &cli.config {
            Some(path) => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| cwd.join(p))
                .unwrap_or_else(|| cwd.clone()),
            None => cwd.clone(),
        };

        let (config, warnings) = Config::load_or_default(&project_root, cli.config.as_deref())?;
        for warning in &warnings {
            tracing::warn!(%warning, "configuration");
            if !cli.json {
                eprintln!("Warning: {}", warning);
            }
        }

        Ok(Self {
            project_root,
            config,
            ui: UiContext::new(cli.json, cli.verbose),
            source_override: cli.source.as_ref().map(|p| cwd.join(p)),
        })
    }

    /// Local tree root: `--source`, else `source.root`
    pub fn source_root(&self) -> PathBuf {
        self.source_override
            .clone()
            .unwrap_or_else(|| self.config.source_root(&self.project_root))
    }

    pub fn load_tree(&self) -> Result<ConfigTree> {
        let root = self.source_root();
        let tree = load_tree(&root, &self.config.tree_load_options())
            .with_context(|| format!("failed to load {}", root.display()))?;
        tracing::info!(files = tree.len(), root = %root.display(), "tree loaded");
        Ok(tree)
    }

    pub fn registry(&self) -> Result<StateRegistry> {
        Ok(self.config.state_registry()?)
    }

    pub fn transport(&self) -> Arc<dyn HostTransport> {
        let host = &self.config.host;
        match host.ssh_destination() {
            Some(dest) => Arc::new(
                SshTransport::new(dest, host.path.clone())
                    .with_command_timeout(self.config.command_timeout()),
            ),
            None => Arc::new(LocalTransport::new(resolve(&self.project_root, &host.path))),
        }
    }

    pub fn runtime(&self, transport: Arc<dyn HostTransport>) -> Arc<dyn HostRuntime> {
        Arc::new(
            CommandRuntime::new(transport, self.config.runtime_commands())
                .with_command_timeout(self.config.command_timeout()),
        )
    }

    pub fn audit_log(&self) -> JsonlAuditLog {
        JsonlAuditLog::new(self.config.audit_path(&self.project_root))
    }
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
