use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};

/// How every command should talk to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    pub json: bool,
    pub verbose: u8,
    pub color: bool,
    pub unicode: bool,
    interactive: bool,
}

impl UiContext {
    pub fn new(json: bool, verbose: u8) -> Self {
        Self::from_caps(json, verbose, detect_capabilities())
    }

    pub(crate) fn from_caps(json: bool, verbose: u8, caps: TerminalCapabilities) -> Self {
        // JSON output is for machines: no escapes, no questions.
        Self {
            json,
            verbose,
            color: !json && caps.supports_color && !caps.is_ci,
            unicode: caps.supports_unicode,
            interactive: !json && caps.is_interactive,
        }
    }

    pub fn can_prompt(&self) -> bool {
        self.interactive
    }
}
