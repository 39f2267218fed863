//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command,
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON body for one event, without the `command` field
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started {
            run_id,
            source,
            destination,
            file_count,
        } => serde_json::json!({
            "event": "start",
            "run_id": run_id,
            "source": source.display().to_string(),
            "destination": destination,
            "file_count": file_count,
        }),

        DeployEvent::Validated { errors, warnings } => serde_json::json!({
            "event": "validated",
            "errors": errors,
            "warnings": warnings,
        }),

        DeployEvent::HostChecked { outcome } => serde_json::json!({
            "event": "host_checked",
            "host_check": outcome,
        }),

        DeployEvent::Planned {
            creates,
            updates,
            deletes,
        } => serde_json::json!({
            "event": "planned",
            "creates": creates,
            "updates": updates,
            "deletes": deletes,
        }),

        DeployEvent::OperationStarted {
            index,
            total,
            kind,
            path,
        } => serde_json::json!({
            "event": "item_start",
            "index": index,
            "total": total,
            "op": kind,
            "path": path,
        }),

        DeployEvent::OperationApplied { index, kind, path } => serde_json::json!({
            "event": "item_applied",
            "index": index,
            "op": kind,
            "path": path,
        }),

        DeployEvent::OperationFailed {
            index,
            kind,
            path,
            error,
        } => serde_json::json!({
            "event": "item_error",
            "index": index,
            "op": kind,
            "path": path,
            "error": error,
        }),

        DeployEvent::ReloadTriggered => serde_json::json!({ "event": "reload" }),

        DeployEvent::HealthProbe { attempt, healthy } => serde_json::json!({
            "event": "health_probe",
            "attempt": attempt,
            "healthy": healthy,
        }),

        DeployEvent::Completed {
            status,
            completed,
            remaining,
        } => serde_json::json!({
            "event": "complete",
            "status": status,
            "success": status.is_success(),
            "completed": completed,
            "remaining": remaining,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let mut json = event_json(&event);
        if let Some(map) = json.as_object_mut() {
            map.insert("command".to_string(), self.command.into());
        }
        self.write_event(json);
    }
}
