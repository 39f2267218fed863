use crate::ui::theme::Tone;

/// A span of text in one tone; plain when color is off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredText {
    text: String,
    tone: Tone,
    bold: bool,
}

macro_rules! toned {
    ($($name:ident => $tone:ident),* $(,)?) => {
        $(
            pub fn $name(text: impl Into<String>) -> Self {
                Self { text: text.into(), tone: Tone::$tone, bold: false }
            }
        )*
    };
}

impl ColoredText {
    toned! {
        success => Success,
        error => Error,
        warning => Warning,
        info => Info,
        dim => Dim,
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn render(&self, supports_color: bool) -> String {
        self.tone.paint(&self.text, self.bold, supports_color)
    }
}
