//! `HAPSYNC_*` overrides that take one of a fixed set of words
//!
//! A bad value never aborts the run: the current setting is kept and a
//! warning, with a typo suggestion when one is close, goes to the writer.

use std::io::Write;
use std::str::FromStr;

use crate::domain::services::closest_match;

pub struct EnvChoice<'a> {
    var: &'a str,
    choices: &'a [&'a str],
}

impl<'a> EnvChoice<'a> {
    pub fn new(var: &'a str, choices: &'a [&'a str]) -> Self {
        Self { var, choices }
    }

    /// `raw` parsed as `T`, or `current` after warning on `out`
    pub fn resolve<T: FromStr, W: Write>(&self, raw: &str, current: T, out: &mut W) -> T {
        if let Ok(parsed) = raw.parse::<T>() {
            return parsed;
        }

        let mut message = format!("Warning: Invalid {} value '{}'", self.var, raw);
        let needle = raw.trim().to_lowercase();
        if let Some(close) = closest_match(&needle, self.choices.iter().copied()) {
            message.push_str(&format!(". Did you mean '{}'?", close));
        }
        // Best effort: a closed stderr is not worth failing over.
        let _ = writeln!(out, "{}", message);
        let _ = writeln!(out, "Valid values: {}", self.choices.join(", "));
        current
    }
}
