use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned as the safe
/// default.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Number of steps in the blue density / calendar colour scale.
pub const HEAT_STEPS: usize = 5;

/// Complete theme definition carrying all UI styles used by events-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    /// The red location disclaimer under the date picker.
    pub note: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,

    // ── Selector ─────────────────────────────────────────────────────────────
    pub selected: Style,
    pub cursor: Style,

    // ── Map ──────────────────────────────────────────────────────────────────
    pub map_boundary: Color,
    pub map_point: Color,

    // ── Heat scale ───────────────────────────────────────────────────────────
    /// Light to dark blues, lowest intensity first.
    pub heat_scale: [Color; HEAT_STEPS],
    /// Text drawn on top of the two darkest heat steps.
    pub heat_text_dark_bg: Color,
    pub heat_text_light_bg: Color,
    /// Calendar cell that has a date but zero events.
    pub calendar_zero: Style,
    pub calendar_focus: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::LightBlue),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            note: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::ITALIC),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            selected: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            cursor: Style::default().add_modifier(Modifier::REVERSED),

            map_boundary: Color::DarkGray,
            map_point: Color::LightMagenta,

            heat_scale: [
                Color::Rgb(198, 219, 239),
                Color::Rgb(158, 202, 225),
                Color::Rgb(107, 174, 214),
                Color::Rgb(49, 130, 189),
                Color::Rgb(8, 81, 156),
            ],
            heat_text_dark_bg: Color::White,
            heat_text_light_bg: Color::Black,
            calendar_zero: Style::default().fg(Color::Gray).bg(Color::Rgb(40, 44, 52)),
            calendar_focus: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text so content remains legible against a
    /// white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            note: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),

            selected: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            cursor: Style::default().add_modifier(Modifier::REVERSED),

            map_boundary: Color::Gray,
            map_point: Color::Magenta,

            heat_scale: [
                Color::Rgb(222, 235, 247),
                Color::Rgb(158, 202, 225),
                Color::Rgb(107, 174, 214),
                Color::Rgb(49, 130, 189),
                Color::Rgb(8, 81, 156),
            ],
            heat_text_dark_bg: Color::White,
            heat_text_light_bg: Color::Black,
            calendar_zero: Style::default().fg(Color::DarkGray).bg(Color::Rgb(247, 251, 255)),
            calendar_focus: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }

    /// Classic terminal theme using only the basic ANSI palette.
    ///
    /// Avoids bold modifiers and RGB colours to maximise compatibility with
    /// minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            note: Style::default().fg(Color::Red),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),

            selected: Style::default().fg(Color::Cyan),
            cursor: Style::default().add_modifier(Modifier::REVERSED),

            map_boundary: Color::White,
            map_point: Color::Magenta,

            heat_scale: [
                Color::Gray,
                Color::Cyan,
                Color::LightBlue,
                Color::Blue,
                Color::DarkGray,
            ],
            heat_text_dark_bg: Color::White,
            heat_text_light_bg: Color::Black,
            calendar_zero: Style::default().fg(Color::Gray),
            calendar_focus: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names (including `"auto"`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Heat-scale step for `value` out of `max`; `None` for zero or below.
    pub fn heat_step(value: f64, max: f64) -> Option<usize> {
        if value <= 0.0 || max <= 0.0 || !value.is_finite() {
            return None;
        }
        let fraction = (value / max).clamp(0.0, 1.0);
        let step = (fraction * HEAT_STEPS as f64).ceil() as usize;
        Some(step.clamp(1, HEAT_STEPS) - 1)
    }

    /// Colour on the blue scale for `value` out of `max`.
    pub fn heat_color(&self, value: f64, max: f64) -> Option<Color> {
        Self::heat_step(value, max).map(|s| self.heat_scale[s])
    }

    /// Background and readable foreground for a calendar cell holding `count`.
    pub fn calendar_style(&self, count: u32, max: u32) -> Style {
        match Self::heat_step(count as f64, max as f64) {
            Some(step) => {
                let fg = if step >= HEAT_STEPS - 2 {
                    self.heat_text_dark_bg
                } else {
                    self.heat_text_light_bg
                };
                Style::default().bg(self.heat_scale[step]).fg(fg)
            }
            None => self.calendar_zero,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
