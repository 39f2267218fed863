//! Console progress for pipeline runs
//!
//! Progress goes to stderr so stdout carries only the final report.

use std::io::Write;
use std::sync::Mutex;

use hapsync::domain::entities::HostCheckSummary;
use hapsync::domain::ports::{DeployEvent, DeployEventSink};

use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::validation::describe_host_check;

pub struct ConsoleEventSink<W: Write + Send = std::io::Stderr> {
    ui: UiContext,
    out: Mutex<W>,
}

impl ConsoleEventSink {
    pub fn stderr(ui: UiContext) -> Self {
        Self::with_writer(ui, std::io::stderr())
    }
}

impl<W: Write + Send> ConsoleEventSink<W> {
    pub fn with_writer(ui: UiContext, out: W) -> Self {
        Self {
            ui,
            out: Mutex::new(out),
        }
    }

    fn icon(&self, icon: Icon) -> String {
        icon.colored(self.ui.color, self.ui.unicode)
    }

    fn line(&self, text: String) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}", text);
    }

    fn render(&self, event: &DeployEvent) -> Option<String> {
        match event {
            DeployEvent::Started { file_count, .. } => Some(format!(
                "{} Loaded {} file(s)",
                self.icon(Icon::Progress),
                file_count
            )),
            DeployEvent::Validated { errors, warnings } => {
                let icon = if *errors > 0 { Icon::Error } else { Icon::Success };
                Some(format!(
                    "{} Validated: {} error(s), {} warning(s)",
                    self.icon(icon),
                    errors,
                    warnings
                ))
            }
            DeployEvent::HostChecked { outcome } => {
                let icon = match outcome {
                    HostCheckSummary::Passed => Icon::Success,
                    HostCheckSummary::Skipped => Icon::Pending,
                    HostCheckSummary::Unreachable { .. } => Icon::Warning,
                    HostCheckSummary::Failed { .. } => Icon::Error,
                };
                Some(format!(
                    "{} Host check {}",
                    self.icon(icon),
                    describe_host_check(outcome)
                ))
            }
            DeployEvent::Planned {
                creates,
                updates,
                deletes,
            } => Some(format!(
                "{} Planned: {} create, {} update, {} delete",
                self.icon(Icon::Progress),
                creates,
                updates,
                deletes
            )),
            DeployEvent::OperationApplied { kind, path, .. } if self.ui.verbose > 0 => Some(
                format!("  {} {} {}", self.icon(Icon::Success), kind.symbol(), path),
            ),
            DeployEvent::OperationFailed { path, error, .. } => Some(format!(
                "  {} {}: {}",
                self.icon(Icon::Error),
                path,
                error
            )),
            DeployEvent::ReloadTriggered => {
                Some(format!("{} Reload requested", self.icon(Icon::Progress)))
            }
            DeployEvent::HealthProbe { attempt, healthy } if self.ui.verbose > 0 || *healthy => {
                let icon = if *healthy { Icon::Success } else { Icon::Pending };
                Some(format!(
                    "{} Health probe {}: {}",
                    self.icon(icon),
                    attempt,
                    if *healthy { "healthy" } else { "not ready" }
                ))
            }
            _ => None,
        }
    }
}

impl<W: Write + Send> DeployEventSink for ConsoleEventSink<W> {
    fn on_event(&self, event: DeployEvent) {
        if let Some(text) = self.render(&event) {
            self.line(text);
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.ui.verbose > 0
    }
}
