use crate::ui::theme::Tone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Pending,
    Arrow,
    // Command identifiers, shown in headers
    Deploy,
    Check,
    Plan,
    State,
    History,
}

impl Icon {
    /// (unicode, ascii) pair
    fn glyphs(self) -> (&'static str, &'static str) {
        match self {
            Icon::Success => ("✓", "[OK]"),
            Icon::Error => ("✗", "[FAIL]"),
            Icon::Warning => ("⚠", "[WARN]"),
            Icon::Progress => ("●", "[..]"),
            Icon::Pending => ("○", "[ ]"),
            Icon::Arrow => ("↳", "[>]"),
            Icon::Deploy => ("📦", "[DEPLOY]"),
            Icon::Check => ("🔍", "[CHECK]"),
            Icon::Plan => ("Δ", "[PLAN]"),
            Icon::State => ("🗂", "[STATE]"),
            Icon::History => ("🕘", "[HISTORY]"),
        }
    }

    fn tone(self) -> Tone {
        match self {
            Icon::Success => Tone::Success,
            Icon::Error => Tone::Error,
            Icon::Warning | Icon::Progress => Tone::Warning,
            Icon::Pending | Icon::Arrow => Tone::Dim,
            _ => Tone::Info,
        }
    }

    pub fn render(&self, supports_unicode: bool) -> &'static str {
        let (unicode, ascii) = self.glyphs();
        if supports_unicode {
            unicode
        } else {
            ascii
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        self.tone()
            .paint(self.render(supports_unicode), false, supports_color)
    }
}
