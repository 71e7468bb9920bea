mod bootstrap;
mod plain;

use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use events_core::settings::Settings;
use events_runtime::data_manager::DataManager;
use events_runtime::session::DashboardSession;
use events_ui::app::{App, AppConfig, ViewMode};
use events_ui::components::map_canvas::MapMarker;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(
        &settings.log_level,
        settings.log_file.as_deref(),
        !settings.plain,
    )?;

    tracing::info!("Special Events v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Timezone: {}",
        settings.view,
        settings.theme,
        settings.timezone
    );

    let data_path = settings
        .data_path
        .clone()
        .or_else(bootstrap::discover_data_path)
        .context("No event data found; pass --data-path")?;
    let boundary_path = settings
        .boundary
        .clone()
        .or_else(|| bootstrap::discover_boundary_path(&data_path));

    let mut manager = DataManager::new(data_path.clone(), boundary_path, &settings.timezone);
    let dataset = manager
        .load()
        .with_context(|| format!("Failed to load events from {}", data_path.display()))?;

    let session = DashboardSession::new(
        dataset,
        settings.date,
        &settings.months,
        usize::from(settings.max_months),
    );

    if settings.plain {
        let report = plain::render_report(&session, !settings.hide_location_note)?;
        print!("{}", report);
        return Ok(());
    }

    let config = AppConfig {
        title: settings.title.clone(),
        theme_name: settings.theme.clone(),
        timezone: settings.timezone.clone(),
        view: ViewMode::from_name(&settings.view),
        marker: MapMarker::from_name(&settings.marker),
        heat_radius: usize::from(settings.heat_radius),
        show_location_note: !settings.hide_location_note,
        calendar_columns: usize::from(settings.calendar_columns),
    };
    let app = App::new(config, session);
    let shutdown = app.shutdown_handle();

    // The terminal loop blocks, so it runs off the async runtime. Ctrl+C is
    // normally read as a key in raw mode; the signal covers SIGINT sent from
    // outside. Either way the UI task restores the terminal before we return.
    let mut ui = tokio::task::spawn_blocking(move || app.run());
    let joined = tokio::select! {
        joined = &mut ui => joined,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            shutdown.store(true, Ordering::Relaxed);
            ui.await
        }
    };
    joined.context("Terminal UI task panicked")??;

    Ok(())
}
