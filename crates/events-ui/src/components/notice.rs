//! Informational notices shown in place of empty visualizations.

use events_data::analysis::Notice;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::themes::Theme;

/// Guidance notices use the warning colour, empty-result notices the info colour.
pub fn notice_style(notice: &Notice, theme: &Theme) -> Style {
    if notice.is_guidance() {
        theme.warning
    } else {
        theme.info
    }
}

pub fn notice_line<'a>(notice: &Notice, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled("ℹ ", notice_style(notice, theme)),
        Span::styled(notice.message(), notice_style(notice, theme)),
    ])
}

/// Render `notice` centred inside an optional titled border.
pub fn render_notice(
    frame: &mut Frame,
    area: Rect,
    notice: &Notice,
    title: Option<&str>,
    theme: &Theme,
) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border);
    if let Some(title) = title {
        block = block.title(format!(" {} ", title));
    }

    let top_pad = area.height.saturating_sub(3) / 2;
    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::from("")).collect();
    lines.push(notice_line(notice, theme));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
