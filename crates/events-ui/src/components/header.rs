use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the dashboard title.
pub const ORNAMENT: &str = "◆";

/// Width of the `=` separator under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Title with ornaments.
/// 2. A 60-column `=` separator.
/// 3. Active view and timezone in `[ view | timezone ]` format.
/// 4. Key help for the active view.
pub struct Header<'a> {
    pub title: &'a str,
    pub view: &'a str,
    pub timezone: &'a str,
    pub help: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        title: &'a str,
        view: &'a str,
        timezone: &'a str,
        help: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            view,
            timezone,
            help,
            theme,
        }
    }

    /// Number of lines produced by [`to_lines`](Self::to_lines).
    pub const HEIGHT: u16 = 4;

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::styled(ORNAMENT, self.theme.header_accent),
                Span::styled(format!(" {} ", self.title), self.theme.header),
                Span::styled(ORNAMENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.view.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(Span::styled(self.help, self.theme.dim)),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
