use anyhow::Result;
use serde_json::json;

use hapsync::application::PlanUseCase;

use crate::commands::Session;
use crate::ui::json::emit;
use crate::ui::views::plan::{render_operations, render_plan_header, render_plan_summary};

/// Exit code when the host cannot be read
const UNREACHABLE: i32 = 3;

pub fn cmd_plan(session: &Session) -> Result<i32> {
    let ui = session.ui;
    let tree = session.load_tree()?;
    let scope = session.config.managed_scope()?;
    let transport = session.transport();
    let registry = session.registry()?;

    if !ui.json {
        print!(
            "{}",
            render_plan_header(
                &transport.describe(),
                scope.roots(),
                ui.color,
                ui.unicode
            )
        );
        println!();
    }

    let result = match PlanUseCase::new(transport, registry).execute(&tree, &scope) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "could not read host manifest");
            if ui.json {
                emit(
                    "plan",
                    json!({"event": "error", "message": err.to_string(), "success": false}),
                )?;
            } else {
                eprintln!("Error: {}", err);
            }
            return Ok(UNREACHABLE);
        }
    };

    if ui.json {
        for op in result.plan.operations() {
            emit(
                "plan",
                json!({"event": "operation", "kind": op.kind.as_str(), "path": op.path}),
            )?;
        }
        emit(
            "plan",
            json!({
                "event": "planned",
                "destination": result.destination,
                "host_files": result.host_files,
                "creates": result.plan.create_count(),
                "updates": result.plan.update_count(),
                "deletes": result.plan.delete_count(),
                "success": true,
            }),
        )?;
    } else {
        print!("{}", render_operations(result.plan.operations(), ui.color));
        if !result.plan.is_empty() {
            println!();
        }
        print!(
            "{}",
            render_plan_summary(&result.plan, ui.color, ui.unicode)
        );
    }

    Ok(0)
}
