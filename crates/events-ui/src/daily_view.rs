//! Daily view: date picker line, point map and event table for one date.

use chrono::NaiveDate;
use events_core::formatting::{format_attendance, format_picker_date, format_timestamp};
use events_core::models::Event;
use events_data::analysis::DailySnapshot;
use events_data::boundary::CityBoundary;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::components::map_canvas::{render_point_map, MapMarker};
use crate::components::notice::render_notice;
use crate::themes::Theme;

const NAME_WIDTH: usize = 34;
const DATE_WIDTH: usize = 16;
const ATTENDANCE_WIDTH: usize = 10;
const ADDRESS_WIDTH: usize = 40;

pub const TABLE_HEADERS: [&str; 5] = ["Name", "Start", "End", "Expected attendance", "Address"];

/// Inputs for [`render_daily_view`].
pub struct DailyViewData<'a> {
    pub snapshot: &'a DailySnapshot,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub boundary: Option<&'a CityBoundary>,
    pub marker: MapMarker,
    pub show_location_note: bool,
}

/// Cut `text` to at most `width` display columns, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// `"Date: DD/MM/YYYY  (DD/MM/YYYY – DD/MM/YYYY)"`.
pub fn picker_line<'a>(
    date: NaiveDate,
    range: Option<(NaiveDate, NaiveDate)>,
    theme: &Theme,
) -> Line<'a> {
    let mut spans = vec![
        Span::styled("Date: ", theme.label),
        Span::styled(format_picker_date(date), theme.value),
    ];
    if let Some((min, max)) = range {
        spans.push(Span::styled(
            format!(
                "  ({} – {})",
                format_picker_date(min),
                format_picker_date(max)
            ),
            theme.dim,
        ));
    }
    Line::from(spans)
}

/// Status lines above the map: picker, summary, and the optional location note.
pub fn status_lines<'a>(data: &DailyViewData, theme: &Theme) -> Vec<Line<'a>> {
    let snapshot = data.snapshot;
    let mut lines = vec![
        picker_line(snapshot.date, data.date_range, theme),
        Line::from(Span::styled(snapshot.summary(), theme.text)),
    ];
    if data.show_location_note {
        let mut spans = vec![Span::styled(
            "Note: the map and table only show events with valid coordinates, \
             not vague locations such as \"In the vicinity of…\".",
            theme.note,
        )];
        let hidden = snapshot.hidden_unlocated();
        if hidden > 0 {
            spans.push(Span::styled(
                format!(" {} event(s) hidden on this date.", hidden),
                theme.note,
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// One table row per located event.
pub fn table_cells(event: &Event) -> [String; 5] {
    [
        truncate(&event.name, NAME_WIDTH),
        format_timestamp(event.start_date),
        format_timestamp(event.end_date),
        format_attendance(event.expected_attendance),
        truncate(&event.address, ADDRESS_WIDTH),
    ]
}

fn render_event_table(frame: &mut Frame, area: Rect, events: &[Event], theme: &Theme) {
    let header = Row::new(
        TABLE_HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(table_cells(event).map(Cell::from)).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(NAME_WIDTH as u16),
        Constraint::Length(DATE_WIDTH as u16),
        Constraint::Length(DATE_WIDTH as u16),
        Constraint::Length(ATTENDANCE_WIDTH.max(TABLE_HEADERS[3].len()) as u16),
        Constraint::Min(ADDRESS_WIDTH as u16 / 2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Events "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the daily view into `area`.
pub fn render_daily_view(frame: &mut Frame, area: Rect, data: &DailyViewData, theme: &Theme) {
    let status = status_lines(data, theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(status.len() as u16),
            Constraint::Percentage(60),
            Constraint::Min(4),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(status), chunks[0]);

    let points: Vec<(f64, f64)> = data
        .snapshot
        .located
        .iter()
        .filter_map(Event::coordinates)
        .collect();
    render_point_map(
        frame,
        chunks[1],
        "Event locations",
        data.boundary,
        &points,
        data.marker,
        theme,
    );

    match &data.snapshot.notice {
        Some(notice) => render_notice(frame, chunks[2], notice, Some("Events"), theme),
        None => render_event_table(frame, chunks[2], &data.snapshot.located, theme),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
