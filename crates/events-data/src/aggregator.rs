//! Event density aggregation over day spans.
//!
//! Counts how many events are active on each calendar date of a period,
//! pivots those counts into a week-by-weekday calendar grid, and derives the
//! capped attendance weights used by the density map.

use chrono::{Datelike, NaiveDate};
use events_core::dates::{days_inclusive, weekday_index};
use events_core::error::{EventsError, Result};
use events_core::formatting::format_long_date;
use events_core::models::{CalendarGrid, DailyCount, Event};
use events_core::percentile::percentile_unsorted;
use tracing::debug;

/// Percentile of attendance used as the weight cap.
pub const ATTENDANCE_CAP_PERCENTILE: f64 = 95.0;

/// Smallest weight any event receives, so zero-attendance events stay visible.
pub const MIN_WEIGHT: f64 = 1.0;

/// Below this many events the percentile cap rests on very few points.
pub const SMALL_SAMPLE: usize = 20;

// ── AttendanceWeighting ───────────────────────────────────────────────────────

/// Output of [`EventDensityAggregator::compute_attendance_weights`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceWeighting {
    /// 95th percentile of attendance, unknown counted as zero.
    pub cap: f64,
    /// One weight per input event, in input order.
    pub weights: Vec<f64>,
}

impl AttendanceWeighting {
    /// Upper bound of every weight: `max(cap, 1)`.
    pub fn max_weight(&self) -> f64 {
        self.cap.max(MIN_WEIGHT)
    }
}

// ── EventDensityAggregator ────────────────────────────────────────────────────

/// Stateless helper computing per-day event density.
pub struct EventDensityAggregator;

impl EventDensityAggregator {
    /// Count the events active on each date of `[period_start, period_end]`.
    ///
    /// Returns one [`DailyCount`] per date, ascending. Fails only when
    /// `period_start > period_end`.
    pub fn compute_daily_counts<'a, I>(
        events: I,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<DailyCount>>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        if period_start > period_end {
            return Err(EventsError::InvalidPeriod {
                start: period_start,
                end: period_end,
            });
        }

        let span = (period_end - period_start).num_days() as usize + 1;
        // diff[i] is the change in active count entering day i.
        let mut diff = vec![0i64; span + 1];

        for event in events {
            let lo = event.start_day().max(period_start);
            let hi = event.end_day().min(period_end);
            if lo > hi {
                continue;
            }
            diff[(lo - period_start).num_days() as usize] += 1;
            diff[(hi - period_start).num_days() as usize + 1] -= 1;
        }

        let mut running = 0i64;
        let counts = days_inclusive(period_start, period_end)
            .zip(diff)
            .map(|(date, delta)| {
                running += delta;
                DailyCount {
                    date,
                    count: running.max(0) as u32,
                    weekday: weekday_index(date),
                    iso_week: date.iso_week().week(),
                }
            })
            .collect();

        Ok(counts)
    }

    /// Pivot daily counts into a week-row by weekday-column grid.
    ///
    /// Rows are numbered from the earliest date's week, counted by position:
    /// `row = (days since earliest + weekday(earliest)) / 7`. Cells without a
    /// date stay `None`.
    pub fn build_calendar_grid(daily_counts: &[DailyCount]) -> CalendarGrid {
        let Some(first) = daily_counts.iter().map(|dc| dc.date).min() else {
            return CalendarGrid::default();
        };
        let offset = weekday_index(first) as i64;

        let mut grid = CalendarGrid::default();
        for dc in daily_counts {
            let row = (((dc.date - first).num_days() + offset) / 7) as usize;
            let col = dc.weekday as usize % 7;
            while grid.counts.len() <= row {
                grid.counts.push([None; 7]);
                grid.labels.push(Default::default());
            }
            grid.counts[row][col] = Some(dc.count);
            grid.labels[row][col] = Some(format_long_date(dc.date));
        }

        grid
    }

    /// Capped, floored attendance weights for the density map.
    ///
    /// Unknown attendance counts as zero. Each weight is
    /// `max(min(attendance, cap), 1)` where `cap` is the 95th percentile.
    /// With every attendance unknown the cap is 0 and all weights are 1.
    pub fn compute_attendance_weights<'a, I>(events: I) -> AttendanceWeighting
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let attendance: Vec<f64> = events
            .into_iter()
            .map(|e| e.attendance_or_zero() as f64)
            .collect();

        if attendance.is_empty() {
            return AttendanceWeighting::default();
        }
        if attendance.len() < SMALL_SAMPLE {
            debug!(
                "Attendance cap computed from only {} events; expect a coarse scale",
                attendance.len()
            );
        }

        let cap = percentile_unsorted(&attendance, ATTENDANCE_CAP_PERCENTILE);
        let weights = attendance
            .iter()
            .map(|&a| a.min(cap).max(MIN_WEIGHT))
            .collect();

        AttendanceWeighting { cap, weights }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use events_core::dates::YearMonth;
    use std::collections::HashSet;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event(start: NaiveDate, end: NaiveDate, attendance: Option<u64>) -> Event {
        Event {
            name: "Event".to_string(),
            start_date: start.and_hms_opt(10, 0, 0).unwrap(),
            end_date: end.and_hms_opt(18, 30, 0).unwrap(),
            address: String::new(),
            expected_attendance: attendance,
            latitude: None,
            longitude: None,
        }
    }

    fn month_counts(events: &[Event], year: i32, month: u32) -> Vec<DailyCount> {
        let ym = YearMonth::new(year, month).unwrap();
        EventDensityAggregator::compute_daily_counts(events, ym.first_day(), ym.last_day())
            .unwrap()
    }

    /// Events scattered across late 2024 and early 2025, some spanning months.
    fn varied_events() -> Vec<Event> {
        vec![
            event(d(2024, 12, 20), d(2025, 1, 4), Some(3_000)),
            event(d(2024, 12, 31), d(2024, 12, 31), None),
            event(d(2025, 1, 1), d(2025, 1, 1), Some(120)),
            event(d(2025, 1, 10), d(2025, 2, 3), Some(0)),
            event(d(2025, 1, 15), d(2025, 1, 17), Some(45)),
            event(d(2025, 1, 31), d(2025, 2, 1), Some(800)),
            event(d(2025, 3, 1), d(2025, 3, 2), None),
        ]
    }

    // ── compute_daily_counts ──────────────────────────────────────────────────

    #[test]
    fn test_daily_counts_concrete_scenario() {
        let events = vec![
            event(d(2025, 1, 1), d(2025, 1, 3), Some(100)),
            event(d(2025, 1, 2), d(2025, 1, 2), None),
        ];
        let counts =
            EventDensityAggregator::compute_daily_counts(&events, d(2025, 1, 1), d(2025, 1, 3))
                .unwrap();
        let values: Vec<u32> = counts.iter().map(|c| c.count).collect();
        assert_eq!(values, vec![1, 2, 1]);
    }

    #[test]
    fn test_daily_counts_one_row_per_day_ascending() {
        let counts = month_counts(&varied_events(), 2024, 2);
        assert_eq!(counts.len(), 29);
        assert!(counts.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(counts[0].date, d(2024, 2, 1));
        assert_eq!(counts[28].date, d(2024, 2, 29));
    }

    #[test]
    fn test_daily_counts_weekday_and_iso_week() {
        let counts =
            EventDensityAggregator::compute_daily_counts(std::iter::empty(), d(2024, 12, 29), d(2025, 1, 1))
                .unwrap();
        // 2024-12-29 is a Sunday in ISO week 52; 2024-12-30 starts ISO week 1.
        assert_eq!(counts[0].weekday, 6);
        assert_eq!(counts[0].iso_week, 52);
        assert_eq!(counts[1].weekday, 0);
        assert_eq!(counts[1].iso_week, 1);
        assert_eq!(counts[3].iso_week, 1);
    }

    #[test]
    fn test_daily_counts_empty_events_all_zero() {
        let counts = month_counts(&[], 2025, 6);
        assert_eq!(counts.len(), 30);
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_daily_counts_single_day_event_counted_once() {
        let events = vec![event(d(2025, 5, 14), d(2025, 5, 14), None)];
        let counts = month_counts(&events, 2025, 5);
        let nonzero: Vec<&DailyCount> = counts.iter().filter(|c| c.count > 0).collect();
        assert_eq!(nonzero.len(), 1);
        assert_eq!(nonzero[0].date, d(2025, 5, 14));
        assert_eq!(nonzero[0].count, 1);
    }

    #[test]
    fn test_daily_counts_only_inside_interval() {
        let e = event(d(2025, 1, 10), d(2025, 1, 12), None);
        let counts = month_counts(std::slice::from_ref(&e), 2025, 1);
        for c in &counts {
            let expected = u32::from(e.is_active_on(c.date));
            assert_eq!(c.count, expected, "date {}", c.date);
        }
    }

    #[test]
    fn test_daily_counts_match_brute_force() {
        let events = varied_events();
        for (year, month) in [(2024, 12), (2025, 1), (2025, 2), (2025, 3), (2025, 4)] {
            let counts = month_counts(&events, year, month);
            for c in &counts {
                let brute = events.iter().filter(|e| e.is_active_on(c.date)).count() as u32;
                assert_eq!(c.count, brute, "date {}", c.date);
            }

            let total: u32 = counts.iter().map(|c| c.count).sum();
            let pairs = counts
                .iter()
                .flat_map(|c| events.iter().map(move |e| (c.date, e)))
                .filter(|(date, e)| e.is_active_on(*date))
                .count() as u32;
            assert_eq!(total, pairs, "{}-{:02}", year, month);
        }
    }

    #[test]
    fn test_daily_counts_single_day_period() {
        let events = varied_events();
        let counts =
            EventDensityAggregator::compute_daily_counts(&events, d(2025, 1, 1), d(2025, 1, 1))
                .unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_daily_counts_rejects_reversed_period() {
        let err = EventDensityAggregator::compute_daily_counts(std::iter::empty(), d(2025, 2, 1), d(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, EventsError::InvalidPeriod { .. }));
    }

    // ── build_calendar_grid ───────────────────────────────────────────────────

    #[test]
    fn test_grid_cell_count_equals_days_in_month() {
        let events = varied_events();
        for (year, month) in [(2024, 2), (2024, 12), (2025, 1), (2025, 6), (2026, 2)] {
            let counts = month_counts(&events, year, month);
            let grid = EventDensityAggregator::build_calendar_grid(&counts);
            assert_eq!(grid.filled_cells(), counts.len(), "{}-{:02}", year, month);

            let labels: Vec<&str> = (0..grid.rows())
                .flat_map(|r| (0..7).map(move |c| (r, c)))
                .filter_map(|(r, c)| grid.label_at(r, c))
                .collect();
            let unique: HashSet<&str> = labels.iter().copied().collect();
            assert_eq!(labels.len(), unique.len());
            assert_eq!(labels.len(), counts.len());
        }
    }

    #[test]
    fn test_grid_absent_cells_are_none_not_zero() {
        // January 2025 starts on Wednesday and ends on Friday.
        let counts = month_counts(&[], 2025, 1);
        let grid = EventDensityAggregator::build_calendar_grid(&counts);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.count_at(0, 0), None);
        assert_eq!(grid.count_at(0, 1), None);
        assert_eq!(grid.count_at(0, 2), Some(0));
        assert_eq!(grid.label_at(0, 2), Some("January 01, 2025"));
        assert_eq!(grid.count_at(4, 4), Some(0));
        assert_eq!(grid.count_at(4, 5), None);
        assert_eq!(grid.count_at(4, 6), None);
    }

    #[test]
    fn test_grid_places_counts_by_weekday() {
        let events = vec![
            event(d(2025, 1, 1), d(2025, 1, 3), Some(100)),
            event(d(2025, 1, 2), d(2025, 1, 2), None),
        ];
        let grid = EventDensityAggregator::build_calendar_grid(&month_counts(&events, 2025, 1));
        assert_eq!(grid.count_at(0, 2), Some(1));
        assert_eq!(grid.count_at(0, 3), Some(2));
        assert_eq!(grid.count_at(0, 4), Some(1));
        assert_eq!(grid.count_at(0, 5), Some(0));
        assert_eq!(grid.max_count(), 2);
    }

    #[test]
    fn test_grid_december_rows_continuous_across_iso_wrap() {
        // 2024-12-30 and 2024-12-31 fall in ISO week 1 of 2025.
        let counts = month_counts(&varied_events(), 2024, 12);
        let grid = EventDensityAggregator::build_calendar_grid(&counts);
        // Dec 1 2024 is a Sunday: six week rows, last one holding Mon 30 and Tue 31.
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.label_at(0, 6), Some("December 01, 2024"));
        assert_eq!(grid.label_at(5, 0), Some("December 30, 2024"));
        assert_eq!(grid.label_at(5, 1), Some("December 31, 2024"));
        assert_eq!(grid.count_at(5, 1), Some(2));
    }

    #[test]
    fn test_grid_span_across_year_boundary() {
        let counts = EventDensityAggregator::compute_daily_counts(
            &varied_events(),
            d(2024, 12, 28),
            d(2025, 1, 6),
        )
        .unwrap();
        let grid = EventDensityAggregator::build_calendar_grid(&counts);
        // Sat 28 Dec .. Mon 6 Jan covers three consecutive week rows.
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.filled_cells(), 10);
        assert_eq!(grid.label_at(0, 5), Some("December 28, 2024"));
        assert_eq!(grid.label_at(1, 0), Some("December 30, 2024"));
        assert_eq!(grid.label_at(1, 2), Some("January 01, 2025"));
        assert_eq!(grid.label_at(2, 0), Some("January 06, 2025"));
    }

    #[test]
    fn test_grid_empty_input() {
        let grid = EventDensityAggregator::build_calendar_grid(&[]);
        assert!(grid.is_empty());
        assert_eq!(grid.filled_cells(), 0);
    }

    #[test]
    fn test_grid_no_events_month_is_all_zero() {
        let grid = EventDensityAggregator::build_calendar_grid(&month_counts(&[], 2025, 4));
        assert_eq!(grid.filled_cells(), 30);
        assert_eq!(grid.max_count(), 0);
    }

    // ── compute_attendance_weights ────────────────────────────────────────────

    #[test]
    fn test_weights_concrete_scenario() {
        let events = vec![
            event(d(2025, 1, 1), d(2025, 1, 3), Some(100)),
            event(d(2025, 1, 2), d(2025, 1, 2), None),
        ];
        let w = EventDensityAggregator::compute_attendance_weights(&events);
        // Linear interpolation over [0, 100] at p95 gives 95.
        assert!((w.cap - 95.0).abs() < 1e-9);
        assert!((w.weights[0] - 95.0).abs() < 1e-9);
        assert_eq!(w.weights[1], 1.0);
    }

    #[test]
    fn test_weights_scenario_with_cap_above_attendance() {
        let mut events = vec![
            event(d(2025, 1, 1), d(2025, 1, 3), Some(100)),
            event(d(2025, 1, 2), d(2025, 1, 2), None),
        ];
        // Enough larger events that the p95 cap sits at or above 100.
        events.extend((0..20).map(|_| event(d(2025, 1, 5), d(2025, 1, 5), Some(500))));
        let w = EventDensityAggregator::compute_attendance_weights(&events);
        assert!(w.cap >= 100.0);
        assert_eq!(w.weights[0], 100.0);
        assert_eq!(w.weights[1], 1.0);
    }

    #[test]
    fn test_weights_within_bounds_and_outliers_clamped() {
        let mut events: Vec<Event> = (1..=19)
            .map(|i| event(d(2025, 1, 1), d(2025, 1, 1), Some(i * 10)))
            .collect();
        events.push(event(d(2025, 1, 1), d(2025, 1, 1), Some(1_000_000)));
        events.push(event(d(2025, 1, 1), d(2025, 1, 1), None));

        let w = EventDensityAggregator::compute_attendance_weights(&events);
        assert_eq!(w.weights.len(), events.len());
        for weight in &w.weights {
            assert!(*weight >= MIN_WEIGHT && *weight <= w.max_weight());
        }
        for (e, weight) in events.iter().zip(&w.weights) {
            if e.attendance_or_zero() as f64 > w.cap {
                assert_eq!(*weight, w.cap);
            }
        }
        assert!(w.cap < 1_000_000.0);
    }

    #[test]
    fn test_weights_preserve_order_below_cap() {
        let events: Vec<Event> = [5, 50, 20, 300]
            .iter()
            .map(|&a| event(d(2025, 1, 1), d(2025, 1, 1), Some(a)))
            .collect();
        let w = EventDensityAggregator::compute_attendance_weights(&events);
        assert!(w.weights[0] < w.weights[2]);
        assert!(w.weights[2] < w.weights[1]);
    }

    #[test]
    fn test_weights_all_unknown_attendance() {
        let events = vec![
            event(d(2025, 1, 1), d(2025, 1, 1), None),
            event(d(2025, 1, 2), d(2025, 1, 2), None),
        ];
        let w = EventDensityAggregator::compute_attendance_weights(&events);
        assert_eq!(w.cap, 0.0);
        assert_eq!(w.weights, vec![1.0, 1.0]);
        assert_eq!(w.max_weight(), 1.0);
    }

    #[test]
    fn test_weights_empty_input() {
        let w = EventDensityAggregator::compute_attendance_weights(std::iter::empty());
        assert_eq!(w.cap, 0.0);
        assert!(w.weights.is_empty());
    }
}
