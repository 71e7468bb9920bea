//! Plain-text rendition of the daily and monthly views for non-TTY use.

use std::fmt::Write as _;

use events_core::error::Result;
use events_core::formatting::{
    format_attendance, format_count, format_picker_date, format_timestamp,
};
use events_core::models::{CalendarGrid, WEEKDAY_LABELS};
use events_data::analysis::{DailySnapshot, MonthlySnapshot};
use events_runtime::session::DashboardSession;

/// Daily listing followed by the monthly calendars.
pub fn render_report(session: &DashboardSession, show_location_note: bool) -> Result<String> {
    let mut out = daily_report(&session.daily(), show_location_note);
    out.push('\n');
    out.push_str(&monthly_report(&session.monthly()?));
    Ok(out)
}

pub fn daily_report(snapshot: &DailySnapshot, show_location_note: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Date: {}", format_picker_date(snapshot.date));
    let _ = writeln!(out, "{}", snapshot.summary());
    if show_location_note && snapshot.hidden_unlocated() > 0 {
        let _ = writeln!(
            out,
            "Note: {} event(s) without valid coordinates are not listed.",
            snapshot.hidden_unlocated()
        );
    }

    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "{}", notice.message());
        return out;
    }

    for event in &snapshot.located {
        let _ = writeln!(
            out,
            "- {} | {} | {} | {} | {}",
            event.name,
            format_timestamp(event.start_date),
            format_timestamp(event.end_date),
            format_attendance(event.expected_attendance),
            event.address
        );
    }
    out
}

pub fn monthly_report(snapshot: &MonthlySnapshot) -> String {
    let mut out = String::new();
    if !snapshot.selected.is_empty() {
        let titles: Vec<String> = snapshot.selected.iter().map(|m| m.title()).collect();
        let _ = writeln!(out, "Months: {}", titles.join(", "));
        let _ = writeln!(
            out,
            "Density map: {} located event(s), attendance cap {}",
            format_count(snapshot.heat_points.len() as u64),
            format_count(snapshot.cap.round() as u64)
        );
    }
    for notice in &snapshot.notices {
        let _ = writeln!(out, "{}", notice.message());
    }

    for calendar in &snapshot.calendars {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", calendar.month.title());
        match (&calendar.grid, calendar.notice()) {
            (Some(grid), _) => out.push_str(&grid_text(grid)),
            (None, Some(notice)) => {
                let _ = writeln!(out, "{}", notice.message());
            }
            (None, None) => {}
        }
    }
    out
}

/// Weekday header then one line of per-day counts per week; `.` pads cells
/// outside the month.
pub fn grid_text(grid: &CalendarGrid) -> String {
    let mut out = WEEKDAY_LABELS
        .iter()
        .map(|l| format!("{:>4}", l))
        .collect::<String>();
    out.push('\n');
    for row in &grid.counts {
        for cell in row {
            match cell {
                Some(count) => {
                    let _ = write!(out, "{:>4}", count);
                }
                None => out.push_str("   ."),
            }
        }
        out.push('\n');
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
