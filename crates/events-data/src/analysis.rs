//! View analysis for the daily and monthly dashboards.
//!
//! Turns the event table and the user's current selection into ready-to-render
//! snapshots. Empty results and selection-count violations become [`Notice`]s
//! instead of errors.

use chrono::NaiveDate;
use events_core::dates::YearMonth;
use events_core::error::Result;
use events_core::formatting::showing_summary;
use events_core::models::{CalendarGrid, DailyCount, Event, EventTable, HeatPoint};
use tracing::debug;

use crate::aggregator::EventDensityAggregator;

// ── Notice ────────────────────────────────────────────────────────────────────

/// Informational message shown in place of an empty visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoEventsOnDate,
    NoLocatedEventsForMonths,
    NoEventsInMonth(YearMonth),
    NoMonthsSelected,
    TooManyMonths { max: usize },
}

impl Notice {
    /// User-facing text.
    pub fn message(&self) -> String {
        match self {
            Notice::NoEventsOnDate => "No events found on this date.".to_string(),
            Notice::NoLocatedEventsForMonths => {
                "No events with locations found for the selected months.".to_string()
            }
            Notice::NoEventsInMonth(month) => format!("No events in {}", month.title()),
            Notice::NoMonthsSelected => {
                "Select one or more months to view calendar heatmaps.".to_string()
            }
            Notice::TooManyMonths { max } => {
                format!("Select {} or less months for readability", max)
            }
        }
    }

    /// Guidance notices ask the user to change the selection; the rest only
    /// report an empty result.
    pub fn is_guidance(&self) -> bool {
        matches!(self, Notice::NoMonthsSelected | Notice::TooManyMonths { .. })
    }
}

// ── Daily view ────────────────────────────────────────────────────────────────

/// Everything the daily view shows for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    /// Active events with usable coordinates, in table order.
    pub located: Vec<Event>,
    /// All events active on `date`, located or not.
    pub active_total: usize,
    pub notice: Option<Notice>,
}

impl DailySnapshot {
    /// Active events left off the map for lack of coordinates.
    pub fn hidden_unlocated(&self) -> usize {
        self.active_total - self.located.len()
    }

    /// `"Showing N event(s) on <Month DD, YYYY>"`.
    pub fn summary(&self) -> String {
        showing_summary(self.located.len(), self.date)
    }
}

/// Events active on `date`, restricted to those that can be mapped.
pub fn daily_snapshot(table: &EventTable, date: NaiveDate) -> DailySnapshot {
    let active = table.active_on(date);
    let located: Vec<Event> = active
        .iter()
        .filter(|e| e.coordinates().is_some())
        .map(|e| (*e).clone())
        .collect();

    let notice = located.is_empty().then_some(Notice::NoEventsOnDate);
    debug!(
        "Daily snapshot for {}: {} active, {} located",
        date,
        active.len(),
        located.len()
    );

    DailySnapshot {
        date,
        located,
        active_total: active.len(),
        notice,
    }
}

// ── Monthly view ──────────────────────────────────────────────────────────────

/// Calendar heatmap data for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCalendar {
    pub month: YearMonth,
    /// Events overlapping the month, located or not.
    pub events_in_month: usize,
    pub daily_counts: Vec<DailyCount>,
    /// `None` when no event touches the month.
    pub grid: Option<CalendarGrid>,
}

impl MonthCalendar {
    /// Notice shown instead of the grid for an empty month.
    pub fn notice(&self) -> Option<Notice> {
        self.grid
            .is_none()
            .then_some(Notice::NoEventsInMonth(self.month))
    }
}

/// Everything the monthly view shows for a month selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySnapshot {
    /// Selected months, chronological and distinct.
    pub selected: Vec<YearMonth>,
    pub heat_points: Vec<HeatPoint>,
    /// Attendance cap behind the heat weights.
    pub cap: f64,
    /// One per selected month; empty when nothing or too much is selected.
    pub calendars: Vec<MonthCalendar>,
    pub notices: Vec<Notice>,
}

impl MonthlySnapshot {
    pub fn max_weight(&self) -> f64 {
        self.heat_points
            .iter()
            .map(|p| p.weight)
            .fold(0.0, f64::max)
    }
}

/// Build the density map and calendar heatmaps for `selected` months.
///
/// The density map uses located events whose start month is selected. Each
/// calendar counts the events overlapping its month. More than `max_months`
/// selected yields [`Notice::TooManyMonths`] and no calendars, while the
/// density map is still produced.
pub fn monthly_snapshot(
    table: &EventTable,
    selected: &[YearMonth],
    max_months: usize,
) -> Result<MonthlySnapshot> {
    let mut months = selected.to_vec();
    months.sort();
    months.dedup();

    let mut snapshot = MonthlySnapshot {
        selected: months,
        ..Default::default()
    };

    if snapshot.selected.is_empty() {
        snapshot.notices.push(Notice::NoMonthsSelected);
        return Ok(snapshot);
    }

    // Density map
    let heat_events: Vec<&Event> = table
        .events()
        .iter()
        .filter(|e| snapshot.selected.contains(&e.start_month()))
        .filter(|e| e.coordinates().is_some())
        .collect();

    if heat_events.is_empty() {
        snapshot.notices.push(Notice::NoLocatedEventsForMonths);
    } else {
        let weighting =
            EventDensityAggregator::compute_attendance_weights(heat_events.iter().copied());
        snapshot.cap = weighting.cap;
        snapshot.heat_points = heat_events
            .iter()
            .zip(&weighting.weights)
            .filter_map(|(event, &weight)| {
                let (latitude, longitude) = event.coordinates()?;
                Some(HeatPoint {
                    latitude,
                    longitude,
                    weight,
                    attendance: event.attendance_or_zero(),
                })
            })
            .collect();
    }

    // Calendars
    if snapshot.selected.len() > max_months {
        snapshot.notices.push(Notice::TooManyMonths { max: max_months });
        return Ok(snapshot);
    }

    for month in &snapshot.selected {
        let (first, last) = (month.first_day(), month.last_day());
        let month_events = table.overlapping(first, last);
        let daily_counts = EventDensityAggregator::compute_daily_counts(
            month_events.iter().copied(),
            first,
            last,
        )?;
        let grid = (!month_events.is_empty())
            .then(|| EventDensityAggregator::build_calendar_grid(&daily_counts));

        snapshot.calendars.push(MonthCalendar {
            month: *month,
            events_in_month: month_events.len(),
            daily_counts,
            grid,
        });
    }

    debug!(
        "Monthly snapshot: {} months, {} heat points, {} calendars",
        snapshot.selected.len(),
        snapshot.heat_points.len(),
        snapshot.calendars.len()
    );

    Ok(snapshot)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
