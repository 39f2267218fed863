use anyhow::{Context, Result};
use serde_json::json;

use hapsync::domain::ports::AuditLog;

use crate::commands::Session;
use crate::ui::json::emit;
use crate::ui::views::history::{render_history, render_history_header, render_last_success};

pub fn cmd_history(session: &Session, last_success: bool, limit: usize) -> Result<i32> {
    let ui = session.ui;
    let audit = session.audit_log();
    let audit_path = session.config.audit_path(&session.project_root);

    if last_success {
        let entry = audit
            .last_successful()
            .context("failed to read the audit log")?;
        return match entry {
            Some(entry) => {
                if ui.json {
                    emit("history", json!({"event": "last_success", "run": entry}))?;
                } else {
                    print!("{}", render_last_success(&entry, ui.color));
                }
                Ok(0)
            }
            None => {
                if ui.json {
                    emit(
                        "history",
                        json!({"event": "last_success", "run": null, "success": false}),
                    )?;
                } else {
                    eprintln!("No successful deployment recorded");
                }
                Ok(1)
            }
        };
    }

    let mut entries = audit.entries().context("failed to read the audit log")?;
    entries.reverse();
    entries.truncate(limit);

    if ui.json {
        for entry in &entries {
            emit("history", json!({"event": "run", "run": entry}))?;
        }
    } else {
        print!(
            "{}",
            render_history_header(&audit_path.display().to_string(), ui.color, ui.unicode)
        );
        println!();
        print!("{}", render_history(&entries, ui.color, ui.unicode));
    }
    Ok(0)
}
