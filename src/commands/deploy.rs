use std::sync::Arc;

use anyhow::{anyhow, Result};

use hapsync::application::{CancelToken, DeployUseCase, HostCheckMode, ReloadPolicy};
use hapsync::domain::entities::DeploymentStatus;
use hapsync::domain::ports::{AutoApprove, DeployEventSink, PlanApprover};
use hapsync::infrastructure::git::source_revision;
use hapsync::infrastructure::{InteractiveApprover, JsonEventSink};

use crate::commands::Session;
use crate::ui::sink::ConsoleEventSink;
use crate::ui::views::deploy::{render_deploy_header, render_deploy_result};
use crate::ui::views::plan::render_operations;
use crate::ui::views::validation::render_validation_report;

#[derive(Debug, Clone, Default)]
pub struct DeployFlags {
    pub dry_run: bool,
    pub skip_host_check: bool,
    pub reload: Option<String>,
    pub yes: bool,
}

pub fn cmd_deploy(session: &Session, flags: &DeployFlags, cancel: CancelToken) -> Result<i32> {
    let ui = session.ui;
    let source = session.source_root();
    let tree = session.load_tree()?;

    let mut options = session
        .config
        .deploy_options()?
        .with_dry_run(flags.dry_run)
        .with_source_revision(source_revision(&source));
    if flags.skip_host_check {
        options = options.with_host_check(HostCheckMode::Off);
    }
    if let Some(policy) = &flags.reload {
        let policy: ReloadPolicy = policy.parse().map_err(|e: String| anyhow!(e))?;
        options = options.with_reload_policy(policy);
    }

    let transport = session.transport();
    let runtime = session.runtime(transport.clone());
    let approver: Arc<dyn PlanApprover> = if flags.yes || ui.json {
        Arc::new(AutoApprove)
    } else {
        Arc::new(InteractiveApprover::new())
    };
    let use_case = DeployUseCase::new(
        transport.clone(),
        runtime,
        Arc::new(session.audit_log()),
        session.registry()?,
    )
    .with_approver(approver)
    .with_cancel_token(cancel);

    let events: Arc<dyn DeployEventSink> = if ui.json {
        Arc::new(JsonEventSink::stdout("deploy"))
    } else {
        let mut modes = Vec::new();
        if flags.dry_run {
            modes.push("dry run");
        }
        if flags.skip_host_check || options.host_check == HostCheckMode::Off {
            modes.push("host check skipped");
        }
        print!(
            "{}",
            render_deploy_header(
                &source,
                &transport.describe(),
                &modes,
                ui.color,
                ui.unicode
            )
        );
        println!();
        Arc::new(ConsoleEventSink::stderr(ui))
    };

    let outcome = use_case.execute_with_events(&tree, &options, events);
    let status = outcome.status();

    if !ui.json {
        if status == DeploymentStatus::ValidationFailed {
            print!(
                "{}",
                render_validation_report(&outcome.report, ui.color, ui.unicode)
            );
            println!();
        }
        if status == DeploymentStatus::Planned {
            if let Some(plan) = &outcome.plan {
                print!("{}", render_operations(plan.operations(), ui.color));
                println!();
            }
        }
        if status == DeploymentStatus::PartialSync {
            println!("Not applied:");
            print!("{}", render_operations(outcome.result.remaining(), ui.color));
            println!();
        }
        print!("{}", render_deploy_result(&outcome, ui.color, ui.unicode));

        let refused_deletes = status == DeploymentStatus::Cancelled
            && outcome.plan.as_ref().is_some_and(|p| p.has_deletes());
        if refused_deletes && !ui.can_prompt() {
            eprintln!("Not running interactively; pass --yes to apply plans that delete host files");
        }
    }

    if let Some(err) = &outcome.audit_error {
        tracing::error!(error = %err, "audit record not written");
    }

    Ok(status.exit_code())
}
