//! Calendar heatmap widget: one bordered month grid with weekday columns.

use chrono::{Datelike, NaiveDate};
use events_core::formatting::{format_long_date, parse_long_date};
use events_core::models::{CalendarGrid, WEEKDAY_LABELS};
use events_data::analysis::MonthCalendar;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::components::notice::render_notice;
use crate::themes::Theme;

/// Terminal columns per day cell, including the gap.
pub const CELL_WIDTH: usize = 4;

/// Width of a calendar including its border.
pub const CALENDAR_WIDTH: u16 = (CELL_WIDTH * 7) as u16 + 2;

/// Height of a six-week calendar including header, detail line and border.
pub const CALENDAR_HEIGHT: u16 = 6 + 4;

/// Grid position `(row, weekday)` of the cell labelled with `date`.
pub fn cell_position(grid: &CalendarGrid, date: NaiveDate) -> Option<(usize, usize)> {
    let label = format_long_date(date);
    (0..grid.rows())
        .flat_map(|row| (0..7).map(move |col| (row, col)))
        .find(|&(row, col)| grid.label_at(row, col) == Some(label.as_str()))
}

/// Hover text for `date`: its cell label and event count, when the grid has it.
pub fn focus_detail(grid: &CalendarGrid, date: NaiveDate) -> Option<String> {
    let (row, col) = cell_position(grid, date)?;
    Some(format!(
        "Date: {} | Number of events: {}",
        grid.label_at(row, col)?,
        grid.count_at(row, col)?
    ))
}

/// Text lines of a populated calendar: weekday header, one line per week,
/// then the focus detail or the busiest-day legend.
pub fn calendar_lines<'a>(
    grid: &CalendarGrid,
    focus: Option<NaiveDate>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let max = grid.max_count();
    let focused = focus.and_then(|d| cell_position(grid, d));

    let mut lines = Vec::with_capacity(grid.rows() + 2);
    lines.push(Line::from(
        WEEKDAY_LABELS
            .iter()
            .map(|l| Span::styled(format!("{:<width$}", l, width = CELL_WIDTH), theme.label))
            .collect::<Vec<_>>(),
    ));

    for row in 0..grid.rows() {
        let mut spans = Vec::with_capacity(14);
        for col in 0..7 {
            let day = grid.label_at(row, col).and_then(parse_long_date);
            match (grid.count_at(row, col), day) {
                (Some(count), Some(day)) => {
                    let mut style = theme.calendar_style(count, max);
                    if focused == Some((row, col)) {
                        style = style.patch(theme.calendar_focus);
                    }
                    spans.push(Span::styled(format!("{:>3}", day.day()), style));
                }
                _ => spans.push(Span::raw("   ")),
            }
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let detail = focus
        .and_then(|d| focus_detail(grid, d))
        .map(|text| Span::styled(text, theme.value))
        .unwrap_or_else(|| Span::styled(format!("busiest day: {} event(s)", max), theme.dim));
    lines.push(Line::from(detail));
    lines
}

/// Render one month: the heatmap grid, or the empty-month notice.
pub fn render_calendar(
    frame: &mut Frame,
    area: Rect,
    calendar: &MonthCalendar,
    focus: Option<NaiveDate>,
    theme: &Theme,
) {
    let title = calendar.month.title();
    let Some(grid) = calendar.grid.as_ref() else {
        if let Some(notice) = calendar.notice() {
            render_notice(frame, area, &notice, Some(&title), theme);
        }
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(Span::styled(format!(" {} ", title), theme.header));
    frame.render_widget(
        Paragraph::new(calendar_lines(grid, focus, theme)).block(block),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
