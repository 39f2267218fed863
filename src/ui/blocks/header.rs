use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

/// Printed before a command does any work: a title, then aligned facts
/// about what it is about to touch.
#[derive(Debug, Clone)]
pub struct CommandHeader {
    icon: Icon,
    title: String,
    facts: Vec<(String, String)>,
}

impl CommandHeader {
    pub fn new(icon: Icon, title: impl Into<String>) -> Self {
        Self {
            icon,
            title: title.into(),
            facts: Vec::new(),
        }
    }

    pub fn add(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.facts.push((label.into(), value.into()));
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let width = self
            .facts
            .iter()
            .map(|(label, _)| label.chars().count() + 1)
            .max()
            .unwrap_or(0);

        let mut lines = vec![format!(
            "{} {}",
            self.icon.colored(supports_color, supports_unicode),
            ColoredText::info(self.title.as_str())
                .bold()
                .render(supports_color)
        )];
        lines.extend(self.facts.iter().map(|(label, value)| {
            let label = ColoredText::dim(format!("{:<width$}", format!("{}:", label)))
                .render(supports_color);
            format!("{} {}", label, value)
        }));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_header_snapshot() {
        let mut header = CommandHeader::new(Icon::Deploy, "hapsync deploy");
        header.add("Source", "config/");
        header.add("Host", "ha:/config");
        header.add("Mode", "dry run");

        insta::assert_snapshot!(header.render(false, false), @r"
        [DEPLOY] hapsync deploy
        Source: config/
        Host:   ha:/config
        Mode:   dry run
        ");
    }

    #[test]
    fn header_without_facts_is_one_line() {
        let header = CommandHeader::new(Icon::State, "hapsync state");
        assert_eq!(header.render(false, false), "[STATE] hapsync state\n");
    }
}
