//! Geography data types and worker channel messages

use bevy::math::DVec2;
use bevy::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender},
};

use crate::geography::hexes::{GeoPolygon, HexOverlay};

/// Natural Earth 110m admin-0 countries, as shipped with the globe library's examples
pub const DEFAULT_GEOGRAPHY_URL: &str = "https://raw.githubusercontent.com/vasturiano/react-globe.gl/master/example/datasets/ne_110m_admin_0_countries.geojson";

/// Where the country outlines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeographySource {
    Http(String),
    File(PathBuf),
}

impl GeographySource {
    /// `http://` and `https://` strings are URLs, anything else is a file path
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            GeographySource::Http(value.to_string())
        } else {
            GeographySource::File(PathBuf::from(value))
        }
    }
}

impl Default for GeographySource {
    fn default() -> Self {
        GeographySource::Http(DEFAULT_GEOGRAPHY_URL.to_string())
    }
}

impl fmt::Display for GeographySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeographySource::Http(url) => f.write_str(url),
            GeographySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// GeoJSON FeatureCollection, reduced to what the overlay needs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Positions are `[lng, lat]` with an optional trailing altitude
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl FeatureCollection {
    /// Every polygon across all features; lines, points and null geometries are skipped
    pub fn polygons(&self) -> Vec<GeoPolygon> {
        let mut polygons = Vec::new();
        for feature in &self.features {
            match &feature.geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    polygons.extend(polygon_from_rings(coordinates));
                }
                Some(Geometry::MultiPolygon { coordinates }) => {
                    polygons.extend(coordinates.iter().filter_map(|p| polygon_from_rings(p)));
                }
                Some(Geometry::Unsupported) | None => {}
            }
        }
        polygons
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<GeoPolygon> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .filter(|pos| pos.len() >= 2)
            .map(|pos| DVec2::new(pos[0], pos[1]))
            .collect::<Vec<_>>()
    });
    let exterior = rings.next()?;
    GeoPolygon::new(exterior, rings.collect())
}

/// Loaded geography for the mounted globe
#[derive(Resource, Default)]
pub struct GeographyData {
    pub status: GeographyStatus,
    pub collection: FeatureCollection,
    pub overlay: Option<HexOverlay>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GeographyStatus {
    #[default]
    Idle,
    Pending,
    Loaded {
        features: usize,
        cells: usize,
    },
    /// Fetch failed; the globe runs with an empty feature set
    Failed(String),
}

/// Commands for the geography worker thread
#[derive(Debug)]
pub enum GeographyCommand {
    Fetch {
        source: GeographySource,
        resolution: u8,
        margin: f32,
        altitude: f32,
    },
}

/// Results from the geography worker thread
#[derive(Debug)]
pub enum GeographyResult {
    Loaded {
        source: GeographySource,
        collection: FeatureCollection,
        overlay: HexOverlay,
    },
    Failed {
        source: GeographySource,
        error: String,
    },
}

/// Resource containing channels for communicating with the geography worker thread
#[derive(Resource)]
pub struct GeographyChannels {
    pub cmd_tx: Sender<GeographyCommand>,
    pub res_rx: Arc<Mutex<Receiver<GeographyResult>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            GeographySource::parse("https://example.com/globe-data.json"),
            GeographySource::Http("https://example.com/globe-data.json".to_string())
        );
        assert_eq!(
            GeographySource::parse(" HTTP://host/a.json "),
            GeographySource::Http("HTTP://host/a.json".to_string())
        );
        assert_eq!(
            GeographySource::parse("assets/globe-data.json"),
            GeographySource::File(PathBuf::from("assets/globe-data.json"))
        );
    }

    #[test]
    fn test_parse_polygon_and_multipolygon() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "NAME": "Square" },
                  "geometry": { "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]] } },
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "MultiPolygon",
                    "coordinates": [
                      [[[20, 20, 5], [30, 20, 5], [30, 30, 5], [20, 20, 5]]],
                      [[[40, 40], [50, 40], [50, 50], [40, 40]]]
                    ] } }
            ]
        }"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.polygons().len(), 3);
    }

    #[test]
    fn test_unsupported_and_null_geometries_are_skipped() {
        let body = r#"{
            "features": [
                { "geometry": null },
                { "geometry": { "type": "Point", "coordinates": [1, 2] } },
                { "geometry": { "type": "LineString", "coordinates": [[1, 2], [3, 4]] } },
                { "properties": {} }
            ]
        }"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        assert_eq!(collection.features.len(), 4);
        assert!(collection.polygons().is_empty());
    }

    #[test]
    fn test_missing_features_is_empty() {
        let collection: FeatureCollection = serde_json::from_str("{}").unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn test_degenerate_rings_are_dropped() {
        let body = r#"{ "features": [ { "geometry": { "type": "Polygon",
            "coordinates": [[[0, 0], [1, 1]]] } } ] }"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        assert!(collection.polygons().is_empty());
    }
}
