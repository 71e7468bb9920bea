//! Main application state and TUI event loop for the special events dashboard.
//!
//! [`App`] owns the theme, the active view and the [`DashboardSession`]
//! holding the user's date and month selection. Key handling is a pure state
//! transition so it can be tested without a terminal.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::{debug, error};

use events_runtime::session::{DashboardSession, ToggleOutcome};

use crate::components::header::Header;
use crate::components::map_canvas::MapMarker;
use crate::daily_view::{self, DailyViewData};
use crate::monthly_view::{self, MonthlyViewData};
use crate::themes::Theme;
use crate::welcome_view::{self, WelcomeViewData};

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Landing page with the analysis period.
    #[default]
    Welcome,
    /// Events on one date.
    Daily,
    /// Density map and calendars for selected months.
    Monthly,
}

impl ViewMode {
    /// Parse a `--view` value; unknown names open the welcome page.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "daily" => Self::Daily,
            "monthly" => Self::Monthly,
            _ => Self::Welcome,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Daily => "Daily",
            Self::Monthly => "Monthly",
        }
    }

    /// Next view in tab order.
    pub fn next(self) -> Self {
        match self {
            Self::Welcome => Self::Daily,
            Self::Daily => Self::Monthly,
            Self::Monthly => Self::Welcome,
        }
    }

    /// Key help shown in the header.
    pub fn help(self) -> &'static str {
        match self {
            Self::Welcome => "1-3/Tab switch view  q quit",
            Self::Daily => "←/→ day  ↑/↓ week  PgUp/PgDn month  Tab view  q quit",
            Self::Monthly => {
                "↑/↓ month  Space toggle  c clear  ←/→ day  PgUp/PgDn week  Tab view  q quit"
            }
        }
    }
}

// ── AppConfig ─────────────────────────────────────────────────────────────────

/// Display options resolved from the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub theme_name: String,
    /// Human-readable timezone string.
    pub timezone: String,
    pub view: ViewMode,
    pub marker: MapMarker,
    pub heat_radius: usize,
    pub show_location_note: bool,
    pub calendar_columns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Special Events: Philadelphia".to_string(),
            theme_name: "auto".to_string(),
            timezone: "UTC".to_string(),
            view: ViewMode::Welcome,
            marker: MapMarker::Braille,
            heat_radius: 2,
            show_location_note: true,
            calendar_columns: 3,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    pub config: AppConfig,
    /// Current view mode.
    pub view_mode: ViewMode,
    pub session: DashboardSession,
    /// Highlighted calendar day in the monthly view.
    pub focus: Option<NaiveDate>,
    /// Transient message, cleared by the next key press.
    pub status: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Quit request from outside the UI thread, e.g. a signal handler.
    shutdown: Arc<AtomicBool>,
}

impl App {
    pub fn new(config: AppConfig, session: DashboardSession) -> Self {
        Self {
            theme: Theme::from_name(&config.theme_name),
            view_mode: config.view,
            config,
            session,
            focus: None,
            status: None,
            should_quit: false,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Flag that stops [`run`](Self::run) within one tick once set.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Whether the event loop should exit.
    pub fn should_stop(&self) -> bool {
        self.should_quit || self.shutdown.load(Ordering::Relaxed)
    }

    /// Run the interactive dashboard until `q`, `Q`, `Ctrl+C` or the
    /// [`shutdown_handle`](Self::shutdown_handle) flag.
    ///
    /// Blocks the calling thread; polls for keys with a 250 ms timeout.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key)
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_stop() {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('1') => return self.switch_view(ViewMode::Welcome),
            KeyCode::Char('2') => return self.switch_view(ViewMode::Daily),
            KeyCode::Char('3') => return self.switch_view(ViewMode::Monthly),
            KeyCode::Tab => return self.switch_view(self.view_mode.next()),
            _ => {}
        }

        match self.view_mode {
            ViewMode::Welcome => {}
            ViewMode::Daily => self.handle_daily_key(key.code),
            ViewMode::Monthly => self.handle_monthly_key(key.code),
        }
    }

    fn switch_view(&mut self, view: ViewMode) {
        debug!(from = self.view_mode.name(), to = view.name(), "switching view");
        self.view_mode = view;
    }

    fn handle_daily_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.session.shift_days(-1),
            KeyCode::Right => self.session.shift_days(1),
            KeyCode::Up => self.session.shift_days(-7),
            KeyCode::Down => self.session.shift_days(7),
            KeyCode::PageUp => self.session.shift_months(-1),
            KeyCode::PageDown => self.session.shift_months(1),
            _ => {}
        }
    }

    fn handle_monthly_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.session.move_cursor(-1),
            KeyCode::Down => self.session.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(ToggleOutcome::Refused(notice)) = self.session.toggle_at_cursor() {
                    self.status = Some(notice.message());
                }
            }
            KeyCode::Char('c') => {
                self.session.clear_months();
                self.focus = None;
            }
            KeyCode::Left => self.shift_focus(-1),
            KeyCode::Right => self.shift_focus(1),
            KeyCode::PageUp => self.shift_focus(-7),
            KeyCode::PageDown => self.shift_focus(7),
            _ => {}
        }
    }

    /// Move the calendar focus; the first move lands on the first day of the
    /// earliest selected month.
    fn shift_focus(&mut self, days: i64) {
        let Some(first) = self.session.selected_months().first() else {
            self.focus = None;
            return;
        };
        self.focus = Some(match self.focus {
            None => first.first_day(),
            Some(d) => d
                .checked_add_signed(chrono::Duration::days(days))
                .unwrap_or(d),
        });
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(Header::HEIGHT), Constraint::Min(0)])
            .split(frame.area());

        let header = Header::new(
            &self.config.title,
            self.view_mode.name(),
            &self.config.timezone,
            self.view_mode.help(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        self.render_body(frame, chunks[1]);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let dataset = self.session.dataset();
        match self.view_mode {
            ViewMode::Welcome => {
                let data = WelcomeViewData {
                    title: self.config.title.clone(),
                    period: self.session.date_range(),
                    stats: dataset.stats.clone(),
                    max_months: self.session.max_months(),
                    boundary_error: dataset.boundary_error.clone(),
                };
                welcome_view::render_welcome_view(frame, area, &data, &self.theme);
            }
            ViewMode::Daily => {
                let snapshot = self.session.daily();
                let data = DailyViewData {
                    snapshot: &snapshot,
                    date_range: self.session.date_range(),
                    boundary: dataset.boundary.as_ref(),
                    marker: self.config.marker,
                    show_location_note: self.config.show_location_note,
                };
                daily_view::render_daily_view(frame, area, &data, &self.theme);
            }
            ViewMode::Monthly => match self.session.monthly() {
                Ok(snapshot) => {
                    let data = MonthlyViewData {
                        snapshot: &snapshot,
                        available: self.session.available_months(),
                        cursor: self.session.cursor(),
                        max_months: self.session.max_months(),
                        boundary: dataset.boundary.as_ref(),
                        heat_radius: self.config.heat_radius,
                        calendar_columns: self.config.calendar_columns,
                        focus: self.focus,
                        status: self.status.as_deref(),
                    };
                    monthly_view::render_monthly_view(frame, area, &data, &self.theme);
                }
                Err(e) => {
                    error!("Monthly view failed: {}", e);
                    frame.render_widget(
                        Paragraph::new(Span::styled(e.to_string(), self.theme.error)),
                        area,
                    );
                }
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
