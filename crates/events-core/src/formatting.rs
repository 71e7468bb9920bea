use chrono::{NaiveDate, NaiveDateTime};

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use events_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format an optional attendance figure; unknown attendance renders as `"—"`.
///
/// # Examples
///
/// ```
/// use events_core::formatting::format_attendance;
///
/// assert_eq!(format_attendance(Some(25_000)), "25,000");
/// assert_eq!(format_attendance(None), "—");
/// ```
pub fn format_attendance(value: Option<u64>) -> String {
    match value {
        Some(v) => format_count(v),
        None => "—".to_string(),
    }
}

const LONG_DATE_FORMAT: &str = "%B %d, %Y";

/// Long date label used in status lines and calendar cells,
/// e.g. `"January 05, 2025"`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use events_core::formatting::format_long_date;
///
/// let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
/// assert_eq!(format_long_date(d), "January 05, 2025");
/// ```
pub fn format_long_date(date: NaiveDate) -> String {
    date.format(LONG_DATE_FORMAT).to_string()
}

/// Inverse of [`format_long_date`].
pub fn parse_long_date(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, LONG_DATE_FORMAT).ok()
}

/// Date-picker display format, `DD/MM/YYYY`.
pub fn format_picker_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Compact timestamp for table cells. Midnight timestamps print the date only.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use events_core::formatting::format_timestamp;
///
/// let d = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
/// assert_eq!(format_timestamp(d.and_hms_opt(18, 30, 0).unwrap()), "2025-07-04 18:30");
/// assert_eq!(format_timestamp(d.and_hms_opt(0, 0, 0).unwrap()), "2025-07-04");
/// ```
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.time() == chrono::NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// `"Showing N event(s) on <Month DD, YYYY>"`.
pub fn showing_summary(count: usize, date: NaiveDate) -> String {
    format!(
        "Showing {} event(s) on {}",
        format_count(count as u64),
        format_long_date(date)
    )
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
