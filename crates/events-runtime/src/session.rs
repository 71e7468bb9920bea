//! Per-session selection state.
//!
//! A [`DashboardSession`] holds the shared [`Dataset`] together with the
//! user's current date and month selection. Every query recomputes its view
//! from the immutable event table; nothing is cached between calls.

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use events_core::dates::{clamp_date, YearMonth};
use events_core::error::Result;
use events_data::analysis::{
    daily_snapshot, monthly_snapshot, DailySnapshot, MonthlySnapshot, Notice,
};

use crate::data_manager::Dataset;

/// Result of toggling a month in the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(YearMonth),
    Removed(YearMonth),
    /// Adding would exceed the month cap; the selection is unchanged.
    Refused(Notice),
}

/// Selection state for the daily and monthly views.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<Dataset>,
    available_months: Vec<YearMonth>,
    date: NaiveDate,
    selected: Vec<YearMonth>,
    /// Index into `available_months` highlighted in the selector.
    cursor: usize,
    max_months: usize,
}

impl DashboardSession {
    /// Start a session.
    ///
    /// `initial_date` is clamped into the dataset's date range. Months not
    /// present in the dataset are dropped; when none remain the latest
    /// available month is selected.
    pub fn new(
        dataset: Arc<Dataset>,
        initial_date: NaiveDate,
        initial_months: &[YearMonth],
        max_months: usize,
    ) -> Self {
        let available_months = dataset.events.available_months();

        let mut selected: Vec<YearMonth> = initial_months
            .iter()
            .copied()
            .filter(|m| available_months.contains(m))
            .collect();
        selected.sort();
        selected.dedup();
        if selected.is_empty() {
            selected.extend(available_months.last().copied());
        }

        let cursor = selected
            .last()
            .and_then(|m| available_months.iter().position(|a| a == m))
            .unwrap_or(0);

        let mut session = Self {
            dataset,
            available_months,
            date: initial_date,
            selected,
            cursor,
            max_months: max_months.max(1),
        };
        session.set_date(initial_date);
        session
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    // ── Date selection ────────────────────────────────────────────────────

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Earliest start and latest end in the dataset.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dataset.events.date_range()
    }

    /// Select `date`, clamped into the dataset's range.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = match self.date_range() {
            Some((min, max)) => clamp_date(date, min, max),
            None => date,
        };
    }

    /// Move the selected date by `days`, staying inside the range.
    pub fn shift_days(&mut self, days: i64) {
        let target = self
            .date
            .checked_add_signed(chrono::Duration::days(days))
            .unwrap_or(self.date);
        self.set_date(target);
    }

    /// Move the selected date by whole months; the day is clipped to the
    /// target month's length.
    pub fn shift_months(&mut self, months: i32) {
        let step = Months::new(months.unsigned_abs());
        let target = if months >= 0 {
            self.date.checked_add_months(step)
        } else {
            self.date.checked_sub_months(step)
        };
        self.set_date(target.unwrap_or(self.date));
    }

    // ── Month selection ───────────────────────────────────────────────────

    pub fn available_months(&self) -> &[YearMonth] {
        &self.available_months
    }

    /// Selected months in chronological order.
    pub fn selected_months(&self) -> &[YearMonth] {
        &self.selected
    }

    pub fn is_selected(&self, month: YearMonth) -> bool {
        self.selected.contains(&month)
    }

    pub fn max_months(&self) -> usize {
        self.max_months
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the selector cursor by `delta`, clamped to the list.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.available_months.is_empty() {
            return;
        }
        let last = self.available_months.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Toggle the month under the cursor.
    pub fn toggle_at_cursor(&mut self) -> Option<ToggleOutcome> {
        let month = self.available_months.get(self.cursor).copied()?;
        Some(self.toggle_month(month))
    }

    /// Add or remove `month`. Adding beyond the cap is refused.
    pub fn toggle_month(&mut self, month: YearMonth) -> ToggleOutcome {
        if let Some(pos) = self.selected.iter().position(|m| *m == month) {
            self.selected.remove(pos);
            return ToggleOutcome::Removed(month);
        }
        if self.selected.len() >= self.max_months {
            tracing::debug!(%month, max = self.max_months, "month selection refused");
            return ToggleOutcome::Refused(Notice::TooManyMonths {
                max: self.max_months,
            });
        }
        let at = self.selected.partition_point(|m| *m < month);
        self.selected.insert(at, month);
        ToggleOutcome::Added(month)
    }

    pub fn clear_months(&mut self) {
        self.selected.clear();
    }

    // ── Views ─────────────────────────────────────────────────────────────

    /// Daily view for the selected date.
    pub fn daily(&self) -> DailySnapshot {
        daily_snapshot(&self.dataset.events, self.date)
    }

    /// Monthly view for the selected months.
    pub fn monthly(&self) -> Result<MonthlySnapshot> {
        monthly_snapshot(&self.dataset.events, &self.selected, self.max_months)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
