use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Success,
    Partial,
    Failure,
}

impl Verdict {
    fn icon(self) -> Icon {
        match self {
            Verdict::Success => Icon::Success,
            Verdict::Partial => Icon::Warning,
            Verdict::Failure => Icon::Error,
        }
    }

    fn title(self, text: &str) -> ColoredText {
        match self {
            Verdict::Success => ColoredText::success(text),
            Verdict::Partial => ColoredText::warning(text),
            Verdict::Failure => ColoredText::error(text),
        }
    }
}

/// Last thing a command prints: the verdict, counts, caveats, and what to
/// run next.
#[derive(Debug, Clone)]
pub struct ResultSummary {
    verdict: Verdict,
    title: String,
    counts: Vec<(String, usize)>,
    caveats: Vec<String>,
    next: Option<String>,
}

impl ResultSummary {
    fn with_verdict(verdict: Verdict, title: impl Into<String>) -> Self {
        Self {
            verdict,
            title: title.into(),
            counts: Vec::new(),
            caveats: Vec::new(),
            next: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::with_verdict(Verdict::Success, title)
    }

    pub fn partial(title: impl Into<String>) -> Self {
        Self::with_verdict(Verdict::Partial, title)
    }

    pub fn failure(title: impl Into<String>) -> Self {
        Self::with_verdict(Verdict::Failure, title)
    }

    pub fn add_stat(&mut self, label: impl Into<String>, count: usize) {
        self.counts.push((label.into(), count));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.caveats.push(message.into());
    }

    pub fn with_next_step(&mut self, hint: impl Into<String>) {
        self.next = Some(hint.into());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let icon = |i: Icon| i.colored(supports_color, supports_unicode);

        let mut lines = vec![format!(
            "{} {}",
            icon(self.verdict.icon()),
            self.verdict
                .title(&self.title)
                .bold()
                .render(supports_color)
        )];

        if !self.counts.is_empty() {
            let counts: Vec<String> = self
                .counts
                .iter()
                .map(|(label, n)| format!("{} {}", n, label))
                .collect();
            lines.push(format!("  {}", counts.join(", ")));
        }
        lines.extend(
            self.caveats
                .iter()
                .map(|c| format!("  {} {}", icon(Icon::Warning), c)),
        );
        if let Some(next) = &self.next {
            lines.push(format!(
                "  {} {} {}",
                icon(Icon::Arrow),
                ColoredText::dim("Next:").render(supports_color),
                next
            ));
        }

        lines.iter().map(|l| format!("{}\n", l)).collect()
    }
}
