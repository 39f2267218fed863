use is_terminal::IsTerminal;

/// What the attached terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Stdin is a terminal, so prompts can be answered
    pub is_interactive: bool,
    pub supports_color: bool,
    pub supports_unicode: bool,
    pub is_ci: bool,
}

impl TerminalCapabilities {
    /// No color, no unicode, no prompts
    pub const PLAIN: Self = Self {
        is_interactive: false,
        supports_color: false,
        supports_unicode: false,
        is_ci: false,
    };
}

pub fn detect_capabilities() -> TerminalCapabilities {
    Detector {
        env: |key: &str| std::env::var(key).ok(),
        stdout_tty: std::io::stdout().is_terminal(),
        stdin_tty: std::io::stdin().is_terminal(),
    }
    .capabilities()
}

struct Detector<E> {
    env: E,
    stdout_tty: bool,
    stdin_tty: bool,
}

const CI_MARKERS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_HOME",
    "BUILDKITE",
    "DRONE",
];

const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];

impl<E: Fn(&str) -> Option<String>> Detector<E> {
    fn is_set(&self, key: &str) -> bool {
        (self.env)(key).is_some_and(|v| !v.is_empty())
    }

    fn capabilities(&self) -> TerminalCapabilities {
        let dumb = (self.env)("TERM").is_some_and(|t| t.eq_ignore_ascii_case("dumb"));
        let is_ci = CI_MARKERS.iter().any(|k| self.is_set(k));

        // NO_COLOR wins over CLICOLOR_FORCE
        let color = if self.is_set("NO_COLOR") {
            false
        } else if self.is_set("CLICOLOR_FORCE") {
            true
        } else {
            self.stdout_tty && !dumb
        };

        TerminalCapabilities {
            is_interactive: self.stdin_tty && !is_ci,
            supports_color: color,
            supports_unicode: !dumb && self.utf8_locale(),
            is_ci,
        }
    }

    /// The first locale variable that is set decides; none set means UTF-8
    fn utf8_locale(&self) -> bool {
        LOCALE_VARS
            .iter()
            .find_map(|k| (self.env)(k).filter(|v| !v.is_empty()))
            .map_or(true, |v| {
                !matches!(v.to_ascii_lowercase().as_str(), "c" | "posix")
            })
    }
}
