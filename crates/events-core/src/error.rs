use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the special-events crates.
#[derive(Error, Debug)]
pub enum EventsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timestamp value did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// An event record is structurally unusable (missing name, bad dates, ...).
    #[error("Invalid event record at {location}: {reason}")]
    InvalidRecord { location: String, reason: String },

    /// A month selection string is neither `YYYY-MM` nor a month label.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// An aggregation period whose start falls after its end.
    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// The configured data path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No event files were found under the given directory.
    #[error("No event files found in {0}")]
    NoDataFiles(PathBuf),

    /// The city-boundary GeoJSON could not be interpreted.
    #[error("Boundary error: {0}")]
    Boundary(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the special-events crates.
pub type Result<T> = std::result::Result<T, EventsError>;
