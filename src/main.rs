//! hapsync CLI - validate, sync and reload a home-automation configuration
//!
//! Usage: hapsync <COMMAND>
//!
//! Commands:
//!   check    Validate the tree, optionally with the host's own checker
//!   plan     Show what a deploy would change on the host
//!   deploy   Validate, check, sync and reload
//!   state    List host-side concerns by classification
//!   history  Show recorded deployments

use anyhow::Result;
use clap::Parser;

use hapsync::application::CancelToken;
use hapsync::infrastructure::logging;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};
use commands::deploy::DeployFlags;
use commands::Session;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("Error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let session = Session::open(&cli)?;

    match cli.command {
        Commands::Check { host, require_host } => {
            commands::check::cmd_check(&session, host, require_host)
        }
        Commands::Plan => commands::plan::cmd_plan(&session),
        Commands::Deploy {
            dry_run,
            skip_host_check,
            reload,
            yes,
        } => {
            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
                tracing::warn!(error = %err, "Ctrl+C handler not installed");
            }
            let flags = DeployFlags {
                dry_run,
                skip_host_check,
                reload,
                yes,
            };
            commands::deploy::cmd_deploy(&session, &flags, cancel)
        }
        Commands::State { class, verify } => commands::state::cmd_state(&session, class, verify),
        Commands::History {
            last_success,
            limit,
        } => commands::history::cmd_history(&session, last_success, limit),
    }
}
