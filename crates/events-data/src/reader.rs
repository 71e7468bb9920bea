//! Event file discovery and loading.
//!
//! Reads geocoded event records from JSON Lines or JSON array files and
//! converts them into [`Event`] structs. Malformed lines, records and
//! `.json` documents are skipped with a warning and counted in [`LoadStats`].

use std::io::BufRead;
use std::path::{Path, PathBuf};

use events_core::dates::TimestampParser;
use events_core::error::{EventsError, Result};
use events_core::models::Event;
use serde_json::Value;
use tracing::{debug, warn};

/// Name used for records that carry no usable `name`.
pub const UNTITLED_EVENT: &str = "Untitled event";

// ── LoadStats ─────────────────────────────────────────────────────────────────

/// Counters collected while loading event files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_read: usize,
    /// Records that were valid JSON objects.
    pub records_read: usize,
    pub events_loaded: usize,
    /// Lines that were not valid JSON.
    pub malformed_lines: usize,
    /// Records rejected by [`parse_event_record`].
    pub invalid_records: usize,
    /// Loaded events without usable coordinates.
    pub missing_coordinates: usize,
    /// `.json` files that were not a record array or a `"data"` table.
    pub skipped_files: usize,
}

/// Events plus the statistics gathered while loading them.
#[derive(Debug, Clone, Default)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    pub stats: LoadStats,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find event files under `data_path`, sorted by path.
///
/// A file path is returned as-is. A directory is walked recursively for
/// `.jsonl` and `.json` files.
pub fn find_event_files(data_path: &Path) -> Vec<PathBuf> {
    if data_path.is_file() {
        return vec![data_path.to_path_buf()];
    }
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_event_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every event under `data_path`.
///
/// Fails when the path is missing, when a directory holds no event files, or
/// when a file cannot be opened. Bad records and unusable `.json` documents
/// never fail the load.
pub fn load_events(data_path: &Path, parser: &TimestampParser) -> Result<LoadedEvents> {
    if !data_path.exists() {
        return Err(EventsError::DataPathNotFound(data_path.to_path_buf()));
    }

    let files = find_event_files(data_path);
    if files.is_empty() {
        return Err(EventsError::NoDataFiles(data_path.to_path_buf()));
    }

    let mut loaded = LoadedEvents::default();
    for file_path in &files {
        match process_single_file(file_path, parser, &mut loaded.stats)? {
            Some(events) => {
                loaded.events.extend(events);
                loaded.stats.files_read += 1;
            }
            None => loaded.stats.skipped_files += 1,
        }
    }

    loaded.stats.events_loaded = loaded.events.len();
    loaded.stats.missing_coordinates = loaded
        .events
        .iter()
        .filter(|e| e.coordinates().is_none())
        .count();

    debug!(
        "Loaded {} events from {} files ({} skipped files, {} malformed lines, {} invalid records, {} without coordinates)",
        loaded.stats.events_loaded,
        loaded.stats.files_read,
        loaded.stats.skipped_files,
        loaded.stats.malformed_lines,
        loaded.stats.invalid_records,
        loaded.stats.missing_coordinates,
    );

    Ok(loaded)
}

/// Convert one JSON record into an [`Event`].
///
/// Expected keys: `name, startDate, endDate, latitude, longitude, expAttend,
/// address`. A missing `endDate` makes a single-day event; an `endDate`
/// before `startDate` rejects the record.
pub fn parse_event_record(record: &Value, parser: &TimestampParser) -> Result<Event> {
    let invalid = |reason: String| EventsError::InvalidRecord {
        location: record_label(record),
        reason,
    };

    if !record.is_object() {
        return Err(invalid("record is not a JSON object".to_string()));
    }

    let start_date = match record.get("startDate") {
        Some(v) if !v.is_null() => parser.parse_value(v)?,
        _ => return Err(invalid("missing startDate".to_string())),
    };
    let end_date = match record.get("endDate") {
        Some(v) if !v.is_null() => parser.parse_value(v)?,
        _ => start_date,
    };
    if end_date < start_date {
        return Err(invalid(format!(
            "endDate {} is before startDate {}",
            end_date, start_date
        )));
    }

    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED_EVENT)
        .to_string();

    let address = record
        .get("address")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    Ok(Event {
        name,
        start_date,
        end_date,
        address,
        expected_attendance: record.get("expAttend").and_then(value_to_attendance),
        latitude: record.get("latitude").and_then(value_to_f64),
        longitude: record.get("longitude").and_then(value_to_f64),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_event_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("json")
    )
}

/// Read one file and map its records, updating `stats`.
///
/// Returns `None` for a `.json` document that holds no records.
fn process_single_file(
    file_path: &Path,
    parser: &TimestampParser,
    stats: &mut LoadStats,
) -> Result<Option<Vec<Event>>> {
    let file = std::fs::File::open(file_path).map_err(|source| EventsError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;

    let records: Vec<Value> = if file_path.extension().is_some_and(|e| e == "jsonl") {
        read_json_lines(file, file_path, stats)
    } else {
        match read_json_document(file, file_path) {
            Ok(records) => records,
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                return Ok(None);
            }
        }
    };

    let mut events = Vec::with_capacity(records.len());
    for record in &records {
        stats.records_read += 1;
        match parse_event_record(record, parser) {
            Ok(event) => events.push(event),
            Err(e) => {
                stats.invalid_records += 1;
                warn!("Skipping record in {}: {}", file_path.display(), e);
            }
        }
    }

    debug!(
        "File {}: {} records, {} events",
        file_path.display(),
        records.len(),
        events.len()
    );

    Ok(Some(events))
}

fn read_json_lines(file: std::fs::File, file_path: &Path, stats: &mut LoadStats) -> Vec<Value> {
    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();

    for (index, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                warn!("Stopped reading {}: {}", file_path.display(), e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => records.push(value),
            Err(e) => {
                stats.malformed_lines += 1;
                warn!(
                    "Malformed JSON at {}:{}: {}",
                    file_path.display(),
                    index + 1,
                    e
                );
            }
        }
    }

    records
}

/// A `.json` file holds either an array of records or a pandas
/// `orient="table"` document whose records sit under `"data"`.
fn read_json_document(file: std::fs::File, file_path: &Path) -> Result<Vec<Value>> {
    let reader = std::io::BufReader::new(file);
    let document: Value = serde_json::from_reader(reader)?;
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(EventsError::InvalidRecord {
                location: file_path.display().to_string(),
                reason: "expected an array of records or a \"data\" array".to_string(),
            }),
        },
        _ => Err(EventsError::InvalidRecord {
            location: file_path.display().to_string(),
            reason: "expected an array of records".to_string(),
        }),
    }
}

/// Short identification of a record for error messages.
fn record_label(record: &Value) -> String {
    record
        .get("name")
        .and_then(Value::as_str)
        .map(|s| format!("\"{}\"", s))
        .unwrap_or_else(|| "record".to_string())
}

/// Numbers and numeric strings become `f64`; anything else is absent.
fn value_to_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Attendance is a non-negative whole number; fractional exports are rounded.
fn value_to_attendance(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value_to_f64(value)?;
    (f >= 0.0).then(|| f.round() as u64)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
