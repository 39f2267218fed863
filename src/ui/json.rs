use std::io::{self, Write};

use serde_json::Value;

/// Write a single NDJSON event (one JSON object per line), tagged with the
/// command that produced it.
pub fn write_event(out: &mut impl Write, command: &str, mut event: Value) -> io::Result<()> {
    if let Value::Object(map) = &mut event {
        map.insert("command".to_string(), Value::String(command.to_string()));
    }
    let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(command: &str, event: Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, command, event)
}
