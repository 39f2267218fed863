use crossterm::style::{Color, Stylize};

/// The five colors the CLI is allowed to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Dim,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Error => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Info => Color::Cyan,
            Tone::Dim => Color::DarkGrey,
        }
    }

    /// Wraps `text` in escapes, or returns it untouched when `enabled` is false
    pub fn paint(self, text: &str, bold: bool, enabled: bool) -> String {
        if !enabled {
            return text.to_string();
        }
        let styled = text.with(self.color());
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }
}
