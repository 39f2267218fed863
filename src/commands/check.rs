use anyhow::Result;
use serde_json::json;

use hapsync::application::{CheckStatus, CheckUseCase, HostCheckMode};

use crate::commands::Session;
use crate::ui::json::emit;
use crate::ui::views::validation::{
    render_check_header, render_check_summary, render_validation_report,
};

pub fn cmd_check(session: &Session, host: bool, require_host: bool) -> Result<i32> {
    let ui = session.ui;
    let tree = session.load_tree()?;

    let mut options = session.config.check_options()?;
    options.host_check = match (host, require_host) {
        (_, true) => HostCheckMode::Required,
        (true, false) if options.host_check == HostCheckMode::Required => HostCheckMode::Required,
        (true, false) => HostCheckMode::Auto,
        (false, false) => HostCheckMode::Off,
    };

    let mut use_case = CheckUseCase::new(session.registry()?);
    let destination = if host {
        let transport = session.transport();
        let destination = transport.describe();
        use_case = use_case.with_host(transport.clone(), session.runtime(transport));
        Some(destination)
    } else {
        None
    };

    if !ui.json {
        print!(
            "{}",
            render_check_header(
                &session.source_root(),
                destination.as_deref(),
                options.host_check,
                ui.color,
                ui.unicode
            )
        );
    }

    let result = use_case.execute(&tree, &options);

    if ui.json {
        for error in result.report.errors() {
            emit("check", json!({"event": "error", "finding": error}))?;
        }
        for warning in result.report.warnings() {
            emit("check", json!({"event": "warning", "finding": warning}))?;
        }
        emit(
            "check",
            json!({
                "event": "complete",
                "status": match result.status {
                    CheckStatus::Pass => "pass",
                    CheckStatus::Degraded => "degraded",
                    CheckStatus::Fail => "fail",
                },
                "files": result.report.files_checked(),
                "errors": result.report.errors().len(),
                "warnings": result.report.warnings().len(),
                "host_check": result.host_check,
                "success": result.is_success(),
            }),
        )?;
    } else {
        println!();
        print!(
            "{}",
            render_validation_report(&result.report, ui.color, ui.unicode)
        );
        if !result.report.errors().is_empty() || !result.report.warnings().is_empty() {
            println!();
        }
        print!("{}", render_check_summary(&result, ui.color, ui.unicode));
    }

    Ok(if result.is_success() { 0 } else { 1 })
}
