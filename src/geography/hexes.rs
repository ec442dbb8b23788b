//! Hexagonal tessellation of country polygons
//!
//! Every H3 cell at the requested resolution whose centre falls inside a
//! country is kept, shrunk toward its centre by the configured margin and
//! triangulated as a fan on the globe surface. Runs on the worker thread;
//! the output is plain vertex data the main thread turns into a mesh.

use bevy::math::{DVec2, DVec3};
use h3o::{CellIndex, LatLng, Resolution};

use crate::core::coordinates::{Coordinates, GLOBE_RADIUS};

/// Cells are enumerated exhaustively, so stay within a few hundred thousand
pub const MAX_HEX_RESOLUTION: u8 = 4;

/// A polygon in degrees (`x` = longitude, `y` = latitude) with optional holes
#[derive(Debug, Clone)]
pub struct GeoPolygon {
    exterior: Vec<DVec2>,
    holes: Vec<Vec<DVec2>>,
    min: DVec2,
    max: DVec2,
}

impl GeoPolygon {
    /// Returns `None` for rings with fewer than three points
    pub fn new(exterior: Vec<DVec2>, holes: Vec<Vec<DVec2>>) -> Option<Self> {
        if exterior.len() < 3 {
            return None;
        }
        let min = exterior.iter().fold(DVec2::MAX, |acc, p| acc.min(*p));
        let max = exterior.iter().fold(DVec2::MIN, |acc, p| acc.max(*p));
        let holes = holes.into_iter().filter(|h| h.len() >= 3).collect();
        Some(Self {
            exterior,
            holes,
            min,
            max,
        })
    }

    pub fn contains(&self, p: DVec2) -> bool {
        if p.x < self.min.x || p.x > self.max.x || p.y < self.min.y || p.y > self.max.y {
            return false;
        }
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }
}

/// Even-odd ray casting; the ring may or may not repeat its first point
fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Triangulated hexagons ready for upload
#[derive(Debug, Clone, Default)]
pub struct HexOverlay {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub cell_count: usize,
}

impl HexOverlay {
    pub fn is_empty(&self) -> bool {
        self.cell_count == 0
    }
}

pub fn tessellate(
    polygons: &[GeoPolygon],
    resolution: u8,
    margin: f32,
    altitude: f32,
) -> anyhow::Result<HexOverlay> {
    if resolution > MAX_HEX_RESOLUTION {
        anyhow::bail!(
            "hex resolution {} is above the supported maximum {}",
            resolution,
            MAX_HEX_RESOLUTION
        );
    }
    let res = Resolution::try_from(resolution)
        .map_err(|e| anyhow::anyhow!("invalid H3 resolution {}: {}", resolution, e))?;

    let mut overlay = HexOverlay::default();
    if polygons.is_empty() {
        return Ok(overlay);
    }

    let scale = (1.0 - margin.clamp(0.0, 0.99)) as f64;
    let radius = GLOBE_RADIUS as f64 * (1.0 + altitude as f64);

    for cell in CellIndex::base_cells().flat_map(|base| base.children(res)) {
        let center = LatLng::from(cell);
        let point = DVec2::new(center.lng(), center.lat());
        if !polygons.iter().any(|poly| poly.contains(point)) {
            continue;
        }

        let center_dir = unit_vector(center.lat(), center.lng());
        let corners: Vec<DVec3> = cell
            .boundary()
            .iter()
            .map(|v| {
                let corner = unit_vector(v.lat(), v.lng());
                (center_dir + (corner - center_dir) * scale).normalize()
            })
            .collect();
        if corners.len() < 3 {
            continue;
        }

        push_fan(&mut overlay, center_dir, &corners, radius);
        overlay.cell_count += 1;
    }

    Ok(overlay)
}

fn unit_vector(lat: f64, lng: f64) -> DVec3 {
    Coordinates {
        latitude: lat.to_radians(),
        longitude: lng.to_radians(),
    }
    .unit_vector()
}

fn push_fan(overlay: &mut HexOverlay, center: DVec3, corners: &[DVec3], radius: f64) {
    let base = overlay.positions.len() as u32;
    let normal = center.as_vec3().to_array();

    overlay.positions.push((center * radius).as_vec3().to_array());
    overlay.normals.push(normal);
    for corner in corners {
        overlay.positions.push((*corner * radius).as_vec3().to_array());
        overlay.normals.push(normal);
    }

    // Wind counter-clockwise as seen from outside the globe
    let outward = (corners[0] - center).cross(corners[1] - center).dot(center) > 0.0;
    let n = corners.len() as u32;
    for i in 0..n {
        let a = base + 1 + i;
        let b = base + 1 + (i + 1) % n;
        if outward {
            overlay.indices.extend_from_slice(&[base, a, b]);
        } else {
            overlay.indices.extend_from_slice(&[base, b, a]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(min, min),
            DVec2::new(max, min),
            DVec2::new(max, max),
            DVec2::new(min, max),
            DVec2::new(min, min),
        ]
    }

    #[test]
    fn test_point_in_polygon_with_hole() {
        let poly = GeoPolygon::new(square(-10.0, 10.0), vec![square(-2.0, 2.0)]).unwrap();
        assert!(poly.contains(DVec2::new(5.0, 5.0)));
        assert!(!poly.contains(DVec2::new(0.0, 0.0)));
        assert!(!poly.contains(DVec2::new(20.0, 0.0)));
        assert!(!poly.contains(DVec2::new(0.0, -11.0)));
    }

    #[test]
    fn test_open_ring_is_handled() {
        let mut ring = square(0.0, 4.0);
        ring.pop();
        let poly = GeoPolygon::new(ring, Vec::new()).unwrap();
        assert!(poly.contains(DVec2::new(2.0, 2.0)));
        assert!(!poly.contains(DVec2::new(5.0, 2.0)));
    }

    #[test]
    fn test_tessellate_keeps_only_inside_cells() {
        let poly = GeoPolygon::new(square(-10.0, 10.0), Vec::new()).unwrap();
        let overlay = tessellate(std::slice::from_ref(&poly), 2, 0.7, 0.001).unwrap();

        assert!(overlay.cell_count > 10, "only {} cells", overlay.cell_count);
        assert_eq!(overlay.positions.len(), overlay.normals.len());
        assert_eq!(overlay.indices.len() % 3, 0);
        assert!(overlay.indices.iter().all(|&i| (i as usize) < overlay.positions.len()));

        // Every fan centre (first vertex of each fan) lies inside the square
        let expected_radius = GLOBE_RADIUS * 1.001;
        for position in &overlay.positions {
            let p = bevy::math::Vec3::from_array(*position);
            assert!((p.length() - expected_radius).abs() < 1e-2);
            let coords: Coordinates = p.into();
            let (lat, lon) = coords.as_degrees();
            assert!(lat.abs() < 12.0 && lon.abs() < 12.0, "vertex at {}, {}", lat, lon);
        }
    }

    #[test]
    fn test_margin_shrinks_cells() {
        let poly = GeoPolygon::new(square(-10.0, 10.0), Vec::new()).unwrap();
        let wide = tessellate(std::slice::from_ref(&poly), 2, 0.0, 0.0).unwrap();
        let narrow = tessellate(std::slice::from_ref(&poly), 2, 0.7, 0.0).unwrap();
        assert_eq!(wide.cell_count, narrow.cell_count);

        let spread = |overlay: &HexOverlay| {
            let center = bevy::math::Vec3::from_array(overlay.positions[0]);
            let corner = bevy::math::Vec3::from_array(overlay.positions[1]);
            center.distance(corner)
        };
        assert!(spread(&narrow) < spread(&wide) * 0.5);
    }

    #[test]
    fn test_empty_polygons_give_empty_overlay() {
        let overlay = tessellate(&[], 3, 0.7, 0.001).unwrap();
        assert!(overlay.is_empty());
        assert!(overlay.positions.is_empty());
    }

    #[test]
    fn test_resolution_above_maximum_is_rejected() {
        let poly = GeoPolygon::new(square(-10.0, 10.0), Vec::new()).unwrap();
        assert!(tessellate(&[poly], MAX_HEX_RESOLUTION + 1, 0.7, 0.001).is_err());
    }

    #[test]
    fn test_fans_face_outward() {
        let poly = GeoPolygon::new(square(30.0, 40.0), Vec::new()).unwrap();
        let overlay = tessellate(&[poly], 2, 0.5, 0.0).unwrap();
        for tri in overlay.indices.chunks(3) {
            let a = bevy::math::Vec3::from_array(overlay.positions[tri[0] as usize]);
            let b = bevy::math::Vec3::from_array(overlay.positions[tri[1] as usize]);
            let c = bevy::math::Vec3::from_array(overlay.positions[tri[2] as usize]);
            assert!((b - a).cross(c - a).dot(a) > 0.0);
        }
    }
}
