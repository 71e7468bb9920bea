//! Monthly view: month selector, attendance-weighted density map and one
//! calendar heatmap per selected month.

use chrono::NaiveDate;
use events_core::dates::YearMonth;
use events_core::formatting::format_count;
use events_data::analysis::{MonthlySnapshot, Notice};
use events_data::boundary::CityBoundary;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::components::calendar::{render_calendar, CALENDAR_HEIGHT, CALENDAR_WIDTH};
use crate::components::map_canvas::render_density_map;
use crate::components::notice::{notice_line, render_notice};
use crate::themes::Theme;

/// Width of the month selector column.
pub const SELECTOR_WIDTH: u16 = 24;

/// Inputs for [`render_monthly_view`].
pub struct MonthlyViewData<'a> {
    pub snapshot: &'a MonthlySnapshot,
    pub available: &'a [YearMonth],
    pub cursor: usize,
    pub max_months: usize,
    pub boundary: Option<&'a CityBoundary>,
    pub heat_radius: usize,
    pub calendar_columns: usize,
    pub focus: Option<NaiveDate>,
    /// Transient message, e.g. a refused selection.
    pub status: Option<&'a str>,
}

/// `"[x] January, 2025"` for selected months, `"[ ] ..."` otherwise.
pub fn selector_label(month: YearMonth, selected: bool) -> String {
    format!("[{}] {}", if selected { "x" } else { " " }, month.label())
}

/// Split `n` calendars into rows of `columns`.
pub fn calendar_rows(n: usize, columns: usize) -> usize {
    let columns = columns.max(1);
    n.div_ceil(columns)
}

/// Selection summary shown above the map.
pub fn summary_line<'a>(data: &MonthlyViewData, theme: &Theme) -> Line<'a> {
    let snapshot = data.snapshot;
    let mut spans = vec![
        Span::styled("Selected ", theme.label),
        Span::styled(
            format!("{} / {}", snapshot.selected.len(), data.max_months),
            theme.value,
        ),
        Span::styled(" months  |  ", theme.label),
        Span::styled(format_count(snapshot.heat_points.len() as u64), theme.value),
        Span::styled(" located events  |  attendance cap ", theme.label),
        Span::styled(format_count(snapshot.cap.round() as u64), theme.value),
    ];
    if let Some(status) = data.status {
        spans.push(Span::styled("  ", theme.text));
        spans.push(Span::styled(status.to_string(), theme.warning));
    }
    Line::from(spans)
}

fn render_selector(frame: &mut Frame, area: Rect, data: &MonthlyViewData, theme: &Theme) {
    let items: Vec<ListItem> = data
        .available
        .iter()
        .map(|&month| {
            let selected = data.snapshot.selected.contains(&month);
            let style = if selected { theme.selected } else { theme.text };
            ListItem::new(Span::styled(selector_label(month, selected), style))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Months "),
        )
        .highlight_style(theme.cursor)
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !data.available.is_empty() {
        state.select(Some(data.cursor.min(data.available.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_calendars(frame: &mut Frame, area: Rect, data: &MonthlyViewData, theme: &Theme) {
    let snapshot = data.snapshot;
    let guidance: Vec<&Notice> = snapshot.notices.iter().filter(|n| n.is_guidance()).collect();

    if snapshot.calendars.is_empty() {
        if let Some(notice) = guidance.first() {
            render_notice(frame, area, notice, Some("Calendars"), theme);
        }
        return;
    }

    let columns = data.calendar_columns.max(1);
    let rows = calendar_rows(snapshot.calendars.len(), columns);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CALENDAR_HEIGHT); rows])
        .split(area);

    for (row_area, chunk) in row_areas.iter().zip(snapshot.calendars.chunks(columns)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(CALENDAR_WIDTH); columns])
            .split(*row_area);
        for (cell, calendar) in cells.iter().zip(chunk) {
            let focus = data.focus.filter(|d| calendar.month.contains(*d));
            render_calendar(frame, *cell, calendar, focus, theme);
        }
    }
}

/// Render the monthly view into `area`.
pub fn render_monthly_view(frame: &mut Frame, area: Rect, data: &MonthlyViewData, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SELECTOR_WIDTH), Constraint::Min(20)])
        .split(area);
    render_selector(frame, columns[0], data, theme);

    let snapshot = data.snapshot;
    let calendar_height = if snapshot.calendars.is_empty() {
        5
    } else {
        CALENDAR_HEIGHT * calendar_rows(snapshot.calendars.len(), data.calendar_columns) as u16
    };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(calendar_height),
        ])
        .split(columns[1]);

    frame.render_widget(Paragraph::new(summary_line(data, theme)), right[0]);

    let map_notice = snapshot
        .notices
        .iter()
        .find(|n| matches!(n, Notice::NoLocatedEventsForMonths));
    match map_notice {
        Some(notice) => render_notice(frame, right[1], notice, Some("Event density"), theme),
        None => render_density_map(
            frame,
            right[1],
            "Event density (attendance weighted)",
            data.boundary,
            &snapshot.heat_points,
            data.heat_radius,
            theme,
        ),
    }

    render_calendars(frame, right[2], data, theme);
}

/// Plain lines for every notice in the snapshot, in order.
pub fn notice_lines<'a>(snapshot: &MonthlySnapshot, theme: &Theme) -> Vec<Line<'a>> {
    snapshot
        .notices
        .iter()
        .map(|n| notice_line(n, theme))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use events_core::models::{Event, EventTable};
    use events_data::analysis::monthly_snapshot;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn event(start: NaiveDate, end: NaiveDate, attendance: u64) -> Event {
        Event {
            name: "Festival".to_string(),
            start_date: start.and_hms_opt(10, 0, 0).unwrap(),
            end_date: end.and_hms_opt(18, 0, 0).unwrap(),
            address: String::new(),
            expected_attendance: Some(attendance),
            latitude: Some(39.95),
            longitude: Some(-75.16),
        }
    }

    fn table() -> EventTable {
        EventTable::new(vec![
            event(d(2024, 12, 30), d(2025, 1, 2), 500),
            event(d(2025, 1, 10), d(2025, 1, 10), 20_000),
            event(d(2025, 3, 1), d(2025, 3, 2), 100),
        ])
    }

    fn data<'a>(snapshot: &'a MonthlySnapshot, available: &'a [YearMonth]) -> MonthlyViewData<'a> {
        MonthlyViewData {
            snapshot,
            available,
            cursor: 0,
            max_months: 6,
            boundary: None,
            heat_radius: 2,
            calendar_columns: 3,
            focus: None,
            status: None,
        }
    }

    fn draw(data: &MonthlyViewData) -> String {
        let mut terminal = Terminal::new(TestBackend::new(130, 50)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_monthly_view(frame, area, data, &theme);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_selector_label() {
        assert_eq!(selector_label(ym(2025, 1), true), "[x] January, 2025");
        assert_eq!(selector_label(ym(2024, 12), false), "[ ] December, 2024");
    }

    #[test]
    fn test_calendar_rows() {
        assert_eq!(calendar_rows(0, 3), 0);
        assert_eq!(calendar_rows(3, 3), 1);
        assert_eq!(calendar_rows(4, 3), 2);
        assert_eq!(calendar_rows(6, 3), 2);
        assert_eq!(calendar_rows(2, 0), 2);
    }

    #[test]
    fn test_summary_line_with_status() {
        let theme = Theme::dark();
        let t = table();
        let snapshot = monthly_snapshot(&t, &[ym(2025, 1)], 6).unwrap();
        let months = t.available_months();
        let mut view = data(&snapshot, &months);
        view.status = Some("Select 6 or less months for readability");
        let line = text(&summary_line(&view, &theme));
        assert!(line.starts_with("Selected 1 / 6 months  |  1 located events"));
        assert!(line.ends_with("Select 6 or less months for readability"));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_monthly_view_calendars() {
        let t = table();
        let months = t.available_months();
        let snapshot = monthly_snapshot(&t, &[ym(2024, 12), ym(2025, 2)], 6).unwrap();
        let content = draw(&data(&snapshot, &months));
        assert!(content.contains("December 2024"));
        assert!(content.contains("No events in February 2025"));
        assert!(content.contains("[x] December, 2024"));
    }

    #[test]
    fn test_render_monthly_view_no_selection() {
        let t = table();
        let months = t.available_months();
        let snapshot = monthly_snapshot(&t, &[], 6).unwrap();
        let content = draw(&data(&snapshot, &months));
        assert!(content.contains("Select one or more months to view calendar heatmaps."));
    }

    #[test]
    fn test_render_monthly_view_too_many_months() {
        let t = table();
        let months = t.available_months();
        let snapshot = monthly_snapshot(&t, &[ym(2024, 12), ym(2025, 1), ym(2025, 3)], 2).unwrap();
        assert!(snapshot.calendars.is_empty());
        let content = draw(&data(&snapshot, &months));
        assert!(content.contains("Select 2 or less months for readability"));
        assert!(content.contains("Event density"));
    }

    #[test]
    fn test_notice_lines() {
        let theme = Theme::dark();
        let snapshot = monthly_snapshot(&table(), &[ym(2025, 2)], 6).unwrap();
        let lines = notice_lines(&snapshot, &theme);
        assert_eq!(lines.len(), 1);
        assert!(text(&lines[0]).contains("No events with locations found"));
    }
}
