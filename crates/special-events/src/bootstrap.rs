use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use events_core::settings::APP_DIR_NAME;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Boundary file names looked up next to the events data.
const BOUNDARY_CANDIDATES: [&str; 3] = [
    "City_Limits.geojson",
    "city_limits.geojson",
    "boundary.geojson",
];

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Ensure `~/.special-events/` and `~/.special-events/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// `~/.special-events/logs/special-events.log`.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("special-events.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name to an [`EnvFilter`] directive.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Initialise the global `tracing` subscriber.
///
/// With `to_file` set, output goes to `log_file` (or [`default_log_file`])
/// so it does not draw over the terminal UI; otherwise it goes to stderr.
/// Unrecognised levels fall back to `info`.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>, to_file: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if to_file {
        let path = log_file.map(Path::to_path_buf).unwrap_or_else(default_log_file);
        let file = open_log_file(&path)?;
        Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };
    let stderr_layer = (!to_file).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate event data when `--data-path` is not given.
///
/// Checks, in order, and returns the first that exists:
/// 1. `./data/`
/// 2. `~/.special-events/data/`
pub fn discover_data_path() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("data")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(APP_DIR_NAME).join("data"));
    }
    candidates.into_iter().find(|p| p.exists())
}

/// Look for a city boundary file beside the events data.
pub fn discover_boundary_path(data_path: &Path) -> Option<PathBuf> {
    let dir = if data_path.is_dir() {
        data_path
    } else {
        data_path.parent()?
    };
    BOUNDARY_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
