//! Landing page: title, analysis period and a short guide to the other views.

use chrono::NaiveDate;
use events_core::formatting::{format_count, format_long_date};
use events_data::reader::LoadStats;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::themes::Theme;

/// Values displayed on the welcome page.
#[derive(Debug, Clone)]
pub struct WelcomeViewData {
    pub title: String,
    /// Earliest start and latest end in the dataset.
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub stats: LoadStats,
    pub max_months: usize,
    /// Why the city boundary overlay is missing.
    pub boundary_error: Option<String>,
}

/// `"Analysis period: <start> to <end>"`, or a placeholder for an empty dataset.
pub fn period_text(period: Option<(NaiveDate, NaiveDate)>) -> String {
    match period {
        Some((start, end)) => format!(
            "Analysis period: {} to {}",
            format_long_date(start),
            format_long_date(end)
        ),
        None => "Analysis period: no events loaded".to_string(),
    }
}

pub fn welcome_lines<'a>(data: &WelcomeViewData, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(data.title.clone(), theme.header)),
        Line::from(""),
        Line::from(Span::styled(period_text(data.period), theme.value)),
        Line::from(""),
        Line::from(Span::styled("About this app", theme.bold)),
        Line::from(Span::styled(
            "Explore the permitted special events held across the city.",
            theme.text,
        )),
        Line::from(vec![
            Span::styled("  Daily view    ", theme.label),
            Span::styled(
                "pick a date to map every event happening that day and list its details.",
                theme.text,
            ),
        ]),
        Line::from(vec![
            Span::styled("  Monthly view  ", theme.label),
            Span::styled(
                "pick months to see an attendance-weighted density map and one calendar heatmap per month.",
                theme.text,
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "Calendar heatmaps are limited to {} months at a time for readability.",
                data.max_months
            ),
            theme.dim,
        )),
        Line::from(""),
        stats_line(&data.stats, theme),
    ];
    if let Some(reason) = &data.boundary_error {
        lines.push(Line::from(Span::styled(
            format!("City boundary unavailable: {}", reason),
            theme.warning,
        )));
    }
    lines
}

fn stats_line<'a>(s: &LoadStats, theme: &Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled("Loaded ", theme.label),
        Span::styled(format_count(s.events_loaded as u64), theme.value),
        Span::styled(" events from ", theme.label),
        Span::styled(format_count(s.files_read as u64), theme.value),
        Span::styled(" file(s); ", theme.label),
        Span::styled(format_count(s.missing_coordinates as u64), theme.value),
        Span::styled(" without coordinates, ", theme.label),
        Span::styled(
            format_count((s.invalid_records + s.malformed_lines) as u64),
            theme.value,
        ),
        Span::styled(" skipped", theme.label),
    ];
    if s.skipped_files > 0 {
        spans.push(Span::styled(", ", theme.label));
        spans.push(Span::styled(format_count(s.skipped_files as u64), theme.value));
        spans.push(Span::styled(" unreadable file(s)", theme.label));
    }
    Line::from(spans)
}

pub fn render_welcome_view(frame: &mut Frame, area: Rect, data: &WelcomeViewData, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Welcome ");
    frame.render_widget(
        Paragraph::new(welcome_lines(data, theme))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
