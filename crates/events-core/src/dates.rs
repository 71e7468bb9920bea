use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EventsError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Day iteration ─────────────────────────────────────────────────────────────

/// Every calendar date from `start` to `end`, both inclusive, ascending.
///
/// Yields nothing when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Weekday index with Monday = 0 … Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Clamp `date` into `[min, max]`.
pub fn clamp_date(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    if date < min {
        min
    } else if date > max {
        max
    } else {
        date
    }
}

// ── YearMonth ─────────────────────────────────────────────────────────────────

/// A calendar month such as January 2025.
///
/// Internally anchored on the first day of the month so every value is a
/// valid date; ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Build from a year and a 1-based month; `None` for an invalid month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the month (28–31).
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The following month, `None` only at the end of chrono's date range.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Selector label, e.g. `"January, 2025"`.
    pub fn label(&self) -> String {
        self.0.format("%B, %Y").to_string()
    }

    /// Calendar title, e.g. `"January 2025"`.
    pub fn title(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

fn numeric_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("regex is valid"))
}

fn label_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]+),?\s+(\d{4})$").expect("regex is valid"))
}

impl FromStr for YearMonth {
    type Err = EventsError;

    /// Accepts `"2025-01"`, `"2025-1"`, `"January, 2025"` and `"Jan 2025"`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || EventsError::InvalidMonth(s.to_string());

        if let Some(caps) = numeric_month_re().captures(trimmed) {
            let year: i32 = caps[1].parse().map_err(|_| invalid())?;
            let month: u32 = caps[2].parse().map_err(|_| invalid())?;
            return Self::new(year, month).ok_or_else(invalid);
        }

        if let Some(caps) = label_month_re().captures(trimmed) {
            let month = chrono::Month::from_str(&caps[1]).map_err(|_| invalid())?;
            let year: i32 = caps[2].parse().map_err(|_| invalid())?;
            return Self::new(year, month.number_from_month()).ok_or_else(invalid);
        }

        Err(invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = EventsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Naive layouts tried, in order, after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses event timestamps into local wall-clock time.
///
/// Offset-carrying timestamps are converted into the configured timezone;
/// naive timestamps are taken as already local.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    tz: Tz,
}

impl TimestampParser {
    /// Create a parser for the given IANA timezone name.
    ///
    /// Unrecognised names fall back to UTC with a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimestampParser: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// The timezone offset-carrying timestamps are converted into.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Parse a timestamp string; `None` for empty or unrecognised input.
    pub fn parse_str(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&self.tz).naive_local());
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Parse a JSON timestamp: a string in any supported layout, or an
    /// integer count of epoch milliseconds (the pandas JSON export of a
    /// tz-naive column, read back as wall-clock time).
    pub fn parse_value(&self, value: &serde_json::Value) -> Result<NaiveDateTime> {
        match value {
            serde_json::Value::String(s) => self
                .parse_str(s)
                .ok_or_else(|| EventsError::TimestampParse(s.clone())),
            serde_json::Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| EventsError::TimestampParse(n.to_string())),
            other => Err(EventsError::TimestampParse(other.to_string())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
