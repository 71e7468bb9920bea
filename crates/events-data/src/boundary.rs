//! City boundary overlay loaded from GeoJSON.
//!
//! Only polygon rings are kept; properties and any non-polygon geometry are
//! ignored. Coordinates follow GeoJSON order, `(longitude, latitude)`.

use std::path::Path;

use events_core::error::{EventsError, Result};
use serde_json::Value;
use tracing::debug;

/// Fallback map centre `(latitude, longitude)`: Philadelphia City Hall.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (39.9526, -75.1652);

/// Half-size in degrees of the fallback viewport.
const DEFAULT_SPAN_DEGREES: f64 = 0.15;

// ── GeoBounds ─────────────────────────────────────────────────────────────────

/// Axis-aligned geographic box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Smallest box holding every `(lon, lat)` point, `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (lon, lat)| {
            Some(match acc {
                None => Self {
                    min_lon: lon,
                    min_lat: lat,
                    max_lon: lon,
                    max_lat: lat,
                },
                Some(b) => Self {
                    min_lon: b.min_lon.min(lon),
                    min_lat: b.min_lat.min(lat),
                    max_lon: b.max_lon.max(lon),
                    max_lat: b.max_lat.max(lat),
                },
            })
        })
    }

    /// Square-ish box of `half_span` degrees around `(lat, lon)`.
    pub fn around(lat: f64, lon: f64, half_span: f64) -> Self {
        Self {
            min_lon: lon - half_span,
            min_lat: lat - half_span,
            max_lon: lon + half_span,
            max_lat: lat + half_span,
        }
    }

    /// The fallback viewport centred on [`DEFAULT_MAP_CENTER`].
    pub fn default_viewport() -> Self {
        Self::around(DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1, DEFAULT_SPAN_DEGREES)
    }

    /// Grow each side by `fraction` of the box size; degenerate boxes grow by
    /// a small fixed margin instead.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad_lon = ((self.max_lon - self.min_lon) * fraction).max(0.005);
        let pad_lat = ((self.max_lat - self.min_lat) * fraction).max(0.005);
        Self {
            min_lon: self.min_lon - pad_lon,
            min_lat: self.min_lat - pad_lat,
            max_lon: self.max_lon + pad_lon,
            max_lat: self.max_lat + pad_lat,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

// ── CityBoundary ──────────────────────────────────────────────────────────────

/// Polygon rings of the city limits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityBoundary {
    rings: Vec<Vec<(f64, f64)>>,
}

impl CityBoundary {
    /// Read and parse a GeoJSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| EventsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        let boundary = Self::from_geojson(&value)?;
        debug!(
            "Loaded boundary {} with {} rings",
            path.display(),
            boundary.rings.len()
        );
        Ok(boundary)
    }

    /// Collect the rings of a `FeatureCollection`, `Feature`, `Polygon` or
    /// `MultiPolygon`. Fails when no ring is found.
    pub fn from_geojson(value: &Value) -> Result<Self> {
        let mut rings = Vec::new();
        collect_rings(value, &mut rings)?;
        if rings.is_empty() {
            return Err(EventsError::Boundary(
                "no polygon rings found in GeoJSON".to_string(),
            ));
        }
        Ok(Self { rings })
    }

    pub fn rings(&self) -> &[Vec<(f64, f64)>] {
        &self.rings
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.rings.iter().flatten().copied())
    }

    /// Consecutive vertex pairs of every ring, ready to draw as lines.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.rings
            .iter()
            .flat_map(|ring| ring.windows(2).map(|w| (w[0], w[1])))
    }
}

fn collect_rings(value: &Value, rings: &mut Vec<Vec<(f64, f64)>>) -> Result<()> {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| EventsError::Boundary("FeatureCollection without features".into()))?;
            for feature in features {
                collect_rings(feature, rings)?;
            }
        }
        "Feature" => {
            if let Some(geometry) = value.get("geometry").filter(|g| !g.is_null()) {
                collect_rings(geometry, rings)?;
            }
        }
        "Polygon" => {
            let coords = coordinates(value)?;
            push_polygon(coords, rings)?;
        }
        "MultiPolygon" => {
            let coords = coordinates(value)?;
            let polygons = coords
                .as_array()
                .ok_or_else(|| EventsError::Boundary("MultiPolygon coordinates must be an array".into()))?;
            for polygon in polygons {
                push_polygon(polygon, rings)?;
            }
        }
        // Points and lines have nothing to outline.
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "GeometryCollection" => {}
        other => {
            return Err(EventsError::Boundary(format!(
                "unsupported GeoJSON type: {:?}",
                other
            )))
        }
    }
    Ok(())
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| EventsError::Boundary("geometry without coordinates".into()))
}

fn push_polygon(polygon: &Value, rings: &mut Vec<Vec<(f64, f64)>>) -> Result<()> {
    let polygon = polygon
        .as_array()
        .ok_or_else(|| EventsError::Boundary("polygon must be an array of rings".into()))?;
    for ring in polygon {
        let positions = ring
            .as_array()
            .ok_or_else(|| EventsError::Boundary("ring must be an array of positions".into()))?;
        let points: Vec<(f64, f64)> = positions.iter().filter_map(position).collect();
        if points.len() >= 2 {
            rings.push(points);
        }
    }
    Ok(())
}

/// `[lon, lat, ...]` into `(lon, lat)`; extra dimensions are ignored.
fn position(value: &Value) -> Option<(f64, f64)> {
    let arr = value.as_array()?;
    let lon = arr.first()?.as_f64()?;
    let lat = arr.get(1)?.as_f64()?;
    Some((lon, lat))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[-75.3, 39.9], [-75.0, 39.9], [-75.0, 40.1], [-75.3, 40.1], [-75.3, 39.9]]]
        })
    }

    #[test]
    fn test_from_geojson_polygon() {
        let boundary = CityBoundary::from_geojson(&square()).unwrap();
        assert_eq!(boundary.rings().len(), 1);
        assert_eq!(boundary.rings()[0].len(), 5);
        assert_eq!(boundary.segments().count(), 4);
    }

    #[test]
    fn test_from_geojson_feature_collection_multipolygon() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "City_Limits" }, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-75.3, 39.9], [-75.0, 39.9], [-75.0, 40.1, 12.0]]],
                        [[[-75.2, 39.95], [-75.1, 39.95], [-75.1, 40.0]]]
                    ]
                }},
                { "type": "Feature", "properties": {}, "geometry": null }
            ]
        });
        let boundary = CityBoundary::from_geojson(&value).unwrap();
        assert_eq!(boundary.rings().len(), 2);
        let b = boundary.bounds().unwrap();
        assert_eq!(b.min_lon, -75.3);
        assert_eq!(b.max_lat, 40.1);
    }

    #[test]
    fn test_from_geojson_rejects_empty_and_unknown() {
        let empty = json!({ "type": "FeatureCollection", "features": [] });
        assert!(matches!(
            CityBoundary::from_geojson(&empty).unwrap_err(),
            EventsError::Boundary(_)
        ));
        let unknown = json!({ "type": "Topology" });
        assert!(CityBoundary::from_geojson(&unknown).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("City_Limits.geojson");
        std::fs::write(&path, square().to_string()).unwrap();
        let boundary = CityBoundary::load(&path).unwrap();
        assert_eq!(boundary.rings().len(), 1);

        let missing = CityBoundary::load(&dir.path().join("nope.geojson")).unwrap_err();
        assert!(matches!(missing, EventsError::FileRead { .. }));
    }

    #[test]
    fn test_geo_bounds_from_points_and_padding() {
        assert!(GeoBounds::from_points(std::iter::empty()).is_none());

        let b = GeoBounds::from_points([(-75.2, 39.9), (-75.1, 40.0)]).unwrap();
        assert!(b.contains(-75.15, 39.95));
        assert!(!b.contains(-75.25, 39.95));

        let padded = b.padded(0.1);
        assert!(padded.min_lon < b.min_lon && padded.max_lat > b.max_lat);

        let single = GeoBounds::from_points([(-75.0, 40.0)]).unwrap().padded(0.1);
        assert!(single.width() > 0.0 && single.height() > 0.0);
    }

    #[test]
    fn test_default_viewport_centred_on_city_hall() {
        let b = GeoBounds::default_viewport();
        assert!(b.contains(DEFAULT_MAP_CENTER.1, DEFAULT_MAP_CENTER.0));
        assert!(((b.min_lat + b.max_lat) / 2.0 - DEFAULT_MAP_CENTER.0).abs() < 1e-9);
    }
}
