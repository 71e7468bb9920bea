use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dates::YearMonth;

/// Name of the per-user directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".special-events";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Maps and calendar heatmaps of special events
#[derive(Parser, Debug, Clone)]
#[command(
    name = "special-events",
    about = "Maps and calendar heatmaps of special events",
    version
)]
pub struct Settings {
    /// Events file (.jsonl / .json) or a directory of event files
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// City boundary GeoJSON drawn as a map overlay
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// View to open
    #[arg(long, default_value = "welcome", value_parser = ["welcome", "daily", "monthly"])]
    pub view: String,

    /// Initial date for the daily view (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-01")]
    pub date: NaiveDate,

    /// Month for the monthly view (YYYY-MM or "January, 2025"); repeatable
    #[arg(long = "month")]
    pub months: Vec<YearMonth>,

    /// Maximum number of calendar heatmaps shown at once (1-12)
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=12))]
    pub max_months: u8,

    /// Calendar heatmaps per row (1-6)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=6))]
    pub calendar_columns: u8,

    /// Timezone offset-carrying timestamps are converted into (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Marker used for event points on the daily map
    #[arg(long, default_value = "braille", value_parser = ["braille", "dot", "block", "half-block"])]
    pub marker: String,

    /// Density-map smoothing radius in map cells (1-8)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=8))]
    pub heat_radius: u8,

    /// Hide the note about events without coordinates
    #[arg(long)]
    pub hide_location_note: bool,

    /// Dashboard title
    #[arg(long, default_value = "Special Events: Philadelphia")]
    pub title: String,

    /// Print the selected views as plain text instead of starting the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.special-events/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<YearMonth>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<PathBuf>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Atomically write params to the default path.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        // Raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. clap ids are field names, not flag spellings.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "date") {
            if let Some(v) = last.date {
                settings.date = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "months") {
            if let Some(v) = last.months {
                settings.months = v;
            }
        }
        if settings.data_path.is_none() {
            settings.data_path = last.data_path;
        }
        if settings.boundary.is_none() {
            settings.boundary = last.boundary;
        }

        settings = Self::resolve_auto_values(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!("Could not save {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    ///
    /// `theme = "auto"` is left for the UI, which inspects the terminal.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::dates::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            view: Some(s.view.clone()),
            date: Some(s.date),
            months: if s.months.is_empty() {
                None
            } else {
                Some(s.months.clone())
            },
            data_path: s.data_path.clone(),
            boundary: s.boundary.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("America/New_York".to_string()),
            view: Some("monthly".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 7, 4),
            months: Some(vec![ym(2024, 6), ym(2024, 7)]),
            data_path: Some(PathBuf::from("/srv/events")),
            boundary: Some(PathBuf::from("/srv/City_Limits.geojson")),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded, params);
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["special-events"]);

        assert!(settings.data_path.is_none());
        assert!(settings.boundary.is_none());
        assert_eq!(settings.view, "welcome");
        assert_eq!(settings.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(settings.months.is_empty());
        assert_eq!(settings.max_months, 6);
        assert_eq!(settings.calendar_columns, 3);
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.marker, "braille");
        assert_eq!(settings.heat_radius, 2);
        assert!(!settings.hide_location_note);
        assert_eq!(settings.title, "Special Events: Philadelphia");
        assert!(!settings.plain);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_repeatable_month_accepts_both_spellings() {
        let settings = Settings::parse_from([
            "special-events",
            "--month",
            "2024-12",
            "--month",
            "January, 2025",
        ]);
        assert_eq!(settings.months, vec![ym(2024, 12), ym(2025, 1)]);
    }

    #[test]
    fn test_settings_rejects_bad_month() {
        let result = Settings::try_parse_from(["special-events", "--month", "2025-13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_max_months_range() {
        assert!(Settings::try_parse_from(["special-events", "--max-months", "0"]).is_err());
        assert!(Settings::try_parse_from(["special-events", "--max-months", "13"]).is_err());
        let s = Settings::parse_from(["special-events", "--max-months", "4"]);
        assert_eq!(s.max_months, 4);
    }

    #[test]
    fn test_settings_date_flag() {
        let s = Settings::parse_from(["special-events", "--date", "2024-07-04"]);
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        assert!(Settings::try_parse_from(["special-events", "--date", "04/07/2024"]).is_err());
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("UTC".to_string()),
            view: Some("monthly".to_string()),
            date: NaiveDate::from_ymd_opt(2023, 9, 1),
            months: Some(vec![ym(2023, 9)]),
            data_path: Some(PathBuf::from("/srv/events.jsonl")),
            boundary: None,
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["special-events".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.view, "monthly");
        assert_eq!(settings.date, NaiveDate::from_ymd_opt(2023, 9, 1).unwrap());
        assert_eq!(settings.months, vec![ym(2023, 9)]);
        assert_eq!(settings.data_path, Some(PathBuf::from("/srv/events.jsonl")));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("UTC".to_string()),
            months: Some(vec![ym(2023, 9)]),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "special-events".into(),
                "--theme".into(),
                "light".into(),
                "--month".into(),
                "2025-02".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.months, vec![ym(2025, 2)]);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["special-events".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["special-events".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "special-events".into(),
                "--theme".into(),
                "classic".into(),
                "--timezone".into(),
                "America/New_York".into(),
            ],
            &config_path,
        );

        assert!(config_path.exists(), "config file must be persisted after run");
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.theme, Some("classic".to_string()));
        assert_eq!(loaded.timezone, Some("America/New_York".to_string()));
        // No --month given and none persisted: nothing stored.
        assert!(loaded.months.is_none());
    }
}
