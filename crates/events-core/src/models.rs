use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::YearMonth;

/// A single scheduled civic event read from the geocoded events file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Display name of the event.
    pub name: String,
    /// Local wall-clock start; never after `end_date`.
    pub start_date: NaiveDateTime,
    /// Local wall-clock end.
    pub end_date: NaiveDateTime,
    /// Street address or free-text location.
    #[serde(default)]
    pub address: String,
    /// Expected attendance, when the permit application stated one.
    #[serde(default)]
    pub expected_attendance: Option<u64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Event {
    /// Calendar day the event starts on.
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date()
    }

    /// Calendar day the event ends on.
    pub fn end_day(&self) -> NaiveDate {
        self.end_date.date()
    }

    /// Month of the start day; the monthly heatmap groups events by it.
    pub fn start_month(&self) -> YearMonth {
        YearMonth::of(self.start_day())
    }

    /// `true` when `start_day <= date <= end_day`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_day() <= date && date <= self.end_day()
    }

    /// `true` when the event is active on at least one day of `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_day() <= end && self.end_day() >= start
    }

    /// `(latitude, longitude)` when both are present, finite and in range.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if lat.is_finite()
                    && lon.is_finite()
                    && (-90.0..=90.0).contains(&lat)
                    && (-180.0..=180.0).contains(&lon) =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }

    /// Attendance with unknown values treated as zero.
    pub fn attendance_or_zero(&self) -> u64 {
        self.expected_attendance.unwrap_or(0)
    }
}

// ── EventTable ────────────────────────────────────────────────────────────────

/// Immutable in-memory table of every loaded event.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    /// Build a table; events are kept sorted by start then end.
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.end_date.cmp(&b.end_date))
        });
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest start day and latest end day, the bounds of the date picker.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.events.iter().map(Event::start_day).min()?;
        let max = self.events.iter().map(Event::end_day).max()?;
        Some((min, max))
    }

    /// Events active on `date`, in table order.
    pub fn active_on(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|e| e.is_active_on(date)).collect()
    }

    /// Events active on at least one day of `[start, end]`.
    pub fn overlapping(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.overlaps(start, end))
            .collect()
    }

    /// Distinct start months, ascending.
    pub fn available_months(&self) -> Vec<YearMonth> {
        let mut months: Vec<YearMonth> = self.events.iter().map(Event::start_month).collect();
        months.sort();
        months.dedup();
        months
    }
}

// ── Derived aggregates ────────────────────────────────────────────────────────

/// Number of active events on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
    /// Monday = 0 … Sunday = 6.
    pub weekday: u32,
    /// ISO-8601 week number of `date`.
    pub iso_week: u32,
}

/// Column headers of a [`CalendarGrid`], Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Week-row by weekday-column table of daily counts.
///
/// `counts` and `labels` are parallel: a cell that has a date has both a
/// count and a label, a cell outside the period has neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarGrid {
    pub counts: Vec<[Option<u32>; 7]>,
    pub labels: Vec<[Option<String>; 7]>,
}

impl CalendarGrid {
    /// Number of week rows.
    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count at `(row, weekday)`, `None` when the cell has no date.
    pub fn count_at(&self, row: usize, weekday: usize) -> Option<u32> {
        self.counts.get(row).and_then(|r| r.get(weekday).copied().flatten())
    }

    /// Date label at `(row, weekday)`, `None` when the cell has no date.
    pub fn label_at(&self, row: usize, weekday: usize) -> Option<&str> {
        self.labels
            .get(row)
            .and_then(|r| r.get(weekday))
            .and_then(|l| l.as_deref())
    }

    /// Number of cells that carry a date.
    pub fn filled_cells(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|r| r.iter())
            .filter(|c| c.is_some())
            .count()
    }

    /// Highest count in the grid, zero when empty.
    pub fn max_count(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|r| r.iter())
            .filter_map(|c| *c)
            .max()
            .unwrap_or(0)
    }
}

/// One located event on the attendance-weighted density map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Capped and floored display weight.
    pub weight: f64,
    /// Raw attendance with unknown treated as zero.
    pub attendance: u64,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
