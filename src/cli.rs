use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hapsync::domain::value_objects::EntityClassification;

/// hapsync - validate, sync and reload a home-automation configuration
#[derive(Parser, Debug)]
#[command(name = "hapsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON (NDJSON events for deploy)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./hapsync.toml)
    #[arg(long, global = true, env = "HAPSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Configuration tree to deploy (overrides `source.root`)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the tree, optionally with the host's own checker
    Check {
        /// Also run the dry-run host check
        #[arg(long)]
        host: bool,

        /// Fail if the host cannot be reached for the check
        #[arg(long, requires = "host")]
        require_host: bool,
    },

    /// Show what a deploy would change on the host
    Plan,

    /// Validate, check, sync and reload
    Deploy {
        /// Stop after planning; nothing is changed on the host
        #[arg(long)]
        dry_run: bool,

        /// Skip the dry-run host check
        #[arg(long)]
        skip_host_check: bool,

        /// Reload policy: never, on-change, always
        #[arg(long, value_name = "POLICY")]
        reload: Option<String>,

        /// Apply plans with deletes without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// List host-side concerns by classification
    State {
        /// Only this class: managed, bootstrap or opaque
        #[arg(long, value_parser = parse_classification)]
        class: Option<EntityClassification>,

        /// Check the tree against the registry
        #[arg(long)]
        verify: bool,
    },

    /// Show recorded deployments
    History {
        /// Only the most recent successful deployment
        #[arg(long)]
        last_success: bool,

        /// Number of runs to show, newest first
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn parse_classification(s: &str) -> Result<EntityClassification, String> {
    s.parse()
}
