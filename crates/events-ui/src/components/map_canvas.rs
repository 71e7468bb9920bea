//! Map rendering on a ratatui canvas.
//!
//! Longitude maps to the canvas x axis and latitude to the y axis. The city
//! boundary is drawn as line segments; events are drawn either as individual
//! points or as a binned, attendance-weighted density raster.

use events_core::models::HeatPoint;
use events_data::boundary::{CityBoundary, GeoBounds};
use ratatui::{
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders,
    },
    Frame,
};

use crate::themes::{Theme, HEAT_STEPS};

/// Fraction of the fitted box added on each side.
const MAP_PADDING: f64 = 0.05;

/// Density cells below this share of the peak are left blank.
const DENSITY_FLOOR: f64 = 0.02;

// ── MapMarker ─────────────────────────────────────────────────────────────────

/// Glyph used for event points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMarker {
    #[default]
    Braille,
    Dot,
    Block,
    HalfBlock,
}

impl MapMarker {
    /// Parse a `--marker` value; unknown names fall back to braille.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dot" => Self::Dot,
            "block" => Self::Block,
            "half-block" => Self::HalfBlock,
            _ => Self::Braille,
        }
    }

    pub fn symbol(self) -> Marker {
        match self {
            Self::Braille => Marker::Braille,
            Self::Dot => Marker::Dot,
            Self::Block => Marker::Block,
            Self::HalfBlock => Marker::HalfBlock,
        }
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Viewport for a map: the boundary when present, else the `(lat, lon)`
/// points, else the default viewport.
pub fn map_bounds(boundary: Option<&CityBoundary>, points: &[(f64, f64)]) -> GeoBounds {
    boundary
        .and_then(CityBoundary::bounds)
        .or_else(|| GeoBounds::from_points(points.iter().map(|&(lat, lon)| (lon, lat))))
        .map(|b| b.padded(MAP_PADDING))
        .unwrap_or_else(GeoBounds::default_viewport)
}

// ── DensityGrid ───────────────────────────────────────────────────────────────

/// Weighted point density binned onto a `cols × rows` raster.
///
/// Row 0 is the southern edge. Each point spreads its weight over cells
/// within `radius` with a linear falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    cols: usize,
    rows: usize,
    bounds: GeoBounds,
    cells: Vec<f64>,
}

impl DensityGrid {
    pub fn build(
        points: &[HeatPoint],
        bounds: GeoBounds,
        cols: usize,
        rows: usize,
        radius: usize,
    ) -> Self {
        let mut grid = Self {
            cols,
            rows,
            bounds,
            cells: vec![0.0; cols * rows],
        };
        if cols == 0 || rows == 0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return grid;
        }

        let r = radius as isize;
        for p in points {
            let Some((cx, cy)) = grid.cell_of(p.longitude, p.latitude) else {
                continue;
            };
            for dy in -r..=r {
                for dx in -r..=r {
                    let dist = ((dx * dx + dy * dy) as f64).sqrt();
                    if dist > radius as f64 {
                        continue;
                    }
                    let (x, y) = (cx as isize + dx, cy as isize + dy);
                    if x < 0 || y < 0 || x >= cols as isize || y >= rows as isize {
                        continue;
                    }
                    let falloff = 1.0 - dist / (radius as f64 + 1.0);
                    grid.cells[y as usize * cols + x as usize] += p.weight * falloff;
                }
            }
        }
        grid
    }

    /// Cell holding `(lon, lat)`, `None` outside the bounds.
    pub fn cell_of(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(lon, lat) {
            return None;
        }
        let fx = (lon - self.bounds.min_lon) / self.bounds.width();
        let fy = (lat - self.bounds.min_lat) / self.bounds.height();
        let x = ((fx * self.cols as f64) as usize).min(self.cols - 1);
        let y = ((fy * self.rows as f64) as usize).min(self.rows - 1);
        Some((x, y))
    }

    /// Geographic centre `(lon, lat)` of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.bounds.min_lon + (col as f64 + 0.5) * self.bounds.width() / self.cols as f64,
            self.bounds.min_lat + (row as f64 + 0.5) * self.bounds.height() / self.rows as f64,
        )
    }

    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.cells.get(row * self.cols + col).copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    /// Cell centres grouped by heat-scale step, lowest step first.
    pub fn buckets(&self) -> [Vec<(f64, f64)>; HEAT_STEPS] {
        let mut buckets: [Vec<(f64, f64)>; HEAT_STEPS] = Default::default();
        let max = self.max();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = self.get(col, row);
                if max <= 0.0 || value / max < DENSITY_FLOOR {
                    continue;
                }
                if let Some(step) = Theme::heat_step(value, max) {
                    buckets[step].push(self.cell_center(col, row));
                }
            }
        }
        buckets
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn draw_boundary(ctx: &mut Context, boundary: Option<&CityBoundary>, color: Color) {
    let Some(boundary) = boundary else {
        return;
    };
    for ((x1, y1), (x2, y2)) in boundary.segments() {
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

/// Render events as points over the boundary. `points` are `(lat, lon)`.
pub fn render_point_map(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    boundary: Option<&CityBoundary>,
    points: &[(f64, f64)],
    marker: MapMarker,
    theme: &Theme,
) {
    let bounds = map_bounds(boundary, points);
    let coords: Vec<(f64, f64)> = points.iter().map(|&(lat, lon)| (lon, lat)).collect();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .marker(marker.symbol())
        .x_bounds([bounds.min_lon, bounds.max_lon])
        .y_bounds([bounds.min_lat, bounds.max_lat])
        .paint(|ctx| {
            draw_boundary(ctx, boundary, theme.map_boundary);
            ctx.layer();
            ctx.draw(&Points {
                coords: &coords,
                color: theme.map_point,
            });
        });

    frame.render_widget(canvas, area);
}

/// Render the attendance-weighted density raster over the boundary.
pub fn render_density_map(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    boundary: Option<&CityBoundary>,
    heat_points: &[HeatPoint],
    radius: usize,
    theme: &Theme,
) {
    let located: Vec<(f64, f64)> = heat_points
        .iter()
        .map(|p| (p.latitude, p.longitude))
        .collect();
    let bounds = map_bounds(boundary, &located);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title));
    let inner = block.inner(area);

    // Half blocks give two raster rows per terminal row.
    let grid = DensityGrid::build(
        heat_points,
        bounds,
        inner.width as usize,
        inner.height as usize * 2,
        radius,
    );
    let buckets = grid.buckets();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::HalfBlock)
        .x_bounds([bounds.min_lon, bounds.max_lon])
        .y_bounds([bounds.min_lat, bounds.max_lat])
        .paint(|ctx| {
            for (step, coords) in buckets.iter().enumerate() {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color: theme.heat_scale[step],
                });
            }
            ctx.layer();
            draw_boundary(ctx, boundary, theme.map_boundary);
        });

    frame.render_widget(canvas, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn heat(lat: f64, lon: f64, weight: f64) -> HeatPoint {
        HeatPoint {
            latitude: lat,
            longitude: lon,
            weight,
            attendance: weight as u64,
        }
    }

    fn boundary() -> CityBoundary {
        CityBoundary::from_geojson(&json!({
            "type": "Polygon",
            "coordinates": [[[-75.28, 39.87], [-74.96, 39.87], [-74.96, 40.14], [-75.28, 40.14], [-75.28, 39.87]]]
        }))
        .unwrap()
    }

    fn unit_bounds() -> GeoBounds {
        GeoBounds {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 10.0,
            max_lat: 10.0,
        }
    }

    // ── MapMarker ─────────────────────────────────────────────────────────────

    #[test]
    fn test_marker_from_name() {
        assert_eq!(MapMarker::from_name("dot"), MapMarker::Dot);
        assert_eq!(MapMarker::from_name("half-block"), MapMarker::HalfBlock);
        assert_eq!(MapMarker::from_name("whatever"), MapMarker::Braille);
        assert_eq!(MapMarker::Block.symbol(), Marker::Block);
    }

    // ── map_bounds ────────────────────────────────────────────────────────────

    #[test]
    fn test_map_bounds_prefers_boundary() {
        let b = map_bounds(Some(&boundary()), &[(10.0, 10.0)]);
        assert!(b.contains(-75.28, 39.87));
        assert!(!b.contains(10.0, 10.0));
    }

    #[test]
    fn test_map_bounds_falls_back_to_points_then_default() {
        let b = map_bounds(None, &[(39.9, -75.2), (40.0, -75.1)]);
        assert!(b.contains(-75.15, 39.95));

        let d = map_bounds(None, &[]);
        assert_eq!(d, GeoBounds::default_viewport());
    }

    // ── DensityGrid ───────────────────────────────────────────────────────────

    #[test]
    fn test_density_grid_single_point_peak() {
        let grid = DensityGrid::build(&[heat(5.5, 5.5, 10.0)], unit_bounds(), 10, 10, 2);
        assert_eq!(grid.cell_of(5.5, 5.5), Some((5, 5)));
        assert_eq!(grid.get(5, 5), 10.0);
        assert_eq!(grid.max(), 10.0);
        assert!(grid.get(6, 5) > 0.0 && grid.get(6, 5) < 10.0);
        assert_eq!(grid.get(9, 9), 0.0);
    }

    #[test]
    fn test_density_grid_accumulates_weights() {
        let points = [heat(5.5, 5.5, 3.0), heat(5.5, 5.5, 4.0), heat(1.5, 1.5, 1.0)];
        let grid = DensityGrid::build(&points, unit_bounds(), 10, 10, 0);
        assert_eq!(grid.get(5, 5), 7.0);
        assert_eq!(grid.get(1, 1), 1.0);
    }

    #[test]
    fn test_density_grid_ignores_points_outside_bounds() {
        let grid = DensityGrid::build(&[heat(50.0, 50.0, 9.0)], unit_bounds(), 4, 4, 1);
        assert_eq!(grid.max(), 0.0);
        assert!(grid.buckets().iter().all(Vec::is_empty));
    }

    #[test]
    fn test_density_grid_edges_clamp_to_last_cell() {
        let grid = DensityGrid::build(&[heat(10.0, 10.0, 1.0)], unit_bounds(), 4, 4, 0);
        assert_eq!(grid.get(3, 3), 1.0);
    }

    #[test]
    fn test_density_buckets_put_peak_in_top_step() {
        let grid = DensityGrid::build(&[heat(5.5, 5.5, 10.0)], unit_bounds(), 10, 10, 1);
        let buckets = grid.buckets();
        assert_eq!(buckets[HEAT_STEPS - 1], vec![grid.cell_center(5, 5)]);
    }

    #[test]
    fn test_density_grid_zero_size() {
        let grid = DensityGrid::build(&[heat(5.0, 5.0, 1.0)], unit_bounds(), 0, 0, 2);
        assert_eq!(grid.max(), 0.0);
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_point_map_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let theme = Theme::dark();
        let b = boundary();
        for marker in [MapMarker::Braille, MapMarker::Dot, MapMarker::Block, MapMarker::HalfBlock] {
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    render_point_map(
                        frame,
                        area,
                        "Events",
                        Some(&b),
                        &[(39.95, -75.16)],
                        marker,
                        &theme,
                    );
                })
                .unwrap();
        }
    }

    #[test]
    fn test_render_density_map_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let theme = Theme::dark();
        let points = [heat(39.95, -75.16, 500.0), heat(40.0, -75.1, 1.0)];
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_density_map(frame, area, "Density", None, &points, 2, &theme);
            })
            .unwrap();

        // Tiny areas leave no room inside the border.
        let mut tiny = Terminal::new(TestBackend::new(2, 2)).unwrap();
        tiny.draw(|frame| {
            let area = frame.area();
            render_density_map(frame, area, "Density", None, &points, 2, &theme);
        })
        .unwrap();
    }
}
