//! Load-once data manager for a dashboard session.
//!
//! Reads the event files and the optional boundary overlay the first time
//! [`DataManager::load`] is called and hands out the resulting [`Dataset`]
//! behind an [`Arc`]. The dataset is immutable for the rest of the session;
//! later calls return the same allocation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use events_core::dates::TimestampParser;
use events_core::error::Result;
use events_core::models::EventTable;
use events_data::boundary::CityBoundary;
use events_data::reader::{load_events, LoadStats};

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Everything read from disk for one session.
#[derive(Debug, Default)]
pub struct Dataset {
    pub events: EventTable,
    /// City limits overlay; `None` when no file was given or it failed to load.
    pub boundary: Option<CityBoundary>,
    /// Why the overlay failed to load.
    pub boundary_error: Option<String>,
    pub stats: LoadStats,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Loads the dataset once and shares it.
///
/// # Example
/// ```no_run
/// use events_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("data/events.jsonl", None, "America/New_York");
/// let dataset = mgr.load().expect("events load");
/// println!("{} events", dataset.events.len());
/// ```
pub struct DataManager {
    data_path: PathBuf,
    boundary_path: Option<PathBuf>,
    parser: TimestampParser,
    dataset: Option<Arc<Dataset>>,
}

impl DataManager {
    pub fn new(
        data_path: impl Into<PathBuf>,
        boundary_path: Option<PathBuf>,
        timezone: &str,
    ) -> Self {
        Self {
            data_path: data_path.into(),
            boundary_path,
            parser: TimestampParser::new(timezone),
            dataset: None,
        }
    }

    /// Return the shared dataset, reading it from disk on the first call.
    ///
    /// Event loading errors are returned; a boundary that cannot be read only
    /// logs a warning, leaves [`Dataset::boundary`] empty and records the
    /// reason in [`Dataset::boundary_error`].
    pub fn load(&mut self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = &self.dataset {
            tracing::debug!("returning already loaded dataset");
            return Ok(Arc::clone(dataset));
        }

        let started = Instant::now();
        let loaded = load_events(&self.data_path, &self.parser)?;
        let events = EventTable::new(loaded.events);
        let (boundary, boundary_error) = match self.load_boundary() {
            Some(Ok(boundary)) => (Some(boundary), None),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "boundary unavailable; map renders without overlay");
                (None, Some(e.to_string()))
            }
            None => (None, None),
        };

        tracing::info!(
            events = events.len(),
            files = loaded.stats.files_read,
            skipped = loaded.stats.malformed_lines + loaded.stats.invalid_records,
            skipped_files = loaded.stats.skipped_files,
            boundary = boundary.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        );

        let dataset = Arc::new(Dataset {
            events,
            boundary,
            boundary_error,
            stats: loaded.stats,
        });
        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    fn load_boundary(&self) -> Option<Result<CityBoundary>> {
        self.boundary_path.as_deref().map(CityBoundary::load)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
