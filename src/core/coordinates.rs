//! Geographic coordinate helpers
//!
//! Latitude/longitude handling for the globe and great-circle sampling used by
//! the arc renderer. World frame: +Y is north, longitude 0 lies on +Z and
//! longitude +90 on +X.

use bevy::math::{DVec3, Vec3};
use std::f64::consts::PI;
use std::fmt;

/// Globe radius in world units.
pub const GLOBE_RADIUS: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CoordError {
    pub msg: String,
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for CoordError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    // Stored internally in radians (f64 for precision)
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Vec3> for Coordinates {
    fn from(value: Vec3) -> Self {
        let n = value.normalize();
        let latitude = (n.y as f64).clamp(-1.0, 1.0).asin();
        let longitude = (n.x as f64).atan2(n.z as f64);
        Coordinates {
            latitude,
            longitude,
        }
    }
}

impl Coordinates {
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordError {
                msg: format!("Invalid latitude: {:?}", latitude),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordError {
                msg: format!("Invalid longitude: {:?}", longitude),
            });
        }
        Ok(Coordinates {
            latitude: latitude.to_radians(),
            longitude: longitude.to_radians(),
        })
    }

    pub fn as_degrees(&self) -> (f64, f64) {
        (self.latitude.to_degrees(), self.longitude.to_degrees())
    }

    pub fn unit_vector(&self) -> DVec3 {
        let y = self.latitude.sin();
        let mut r = self.latitude.cos();
        // Clamp residual radius at the poles so both poles map to a single point
        if (std::f64::consts::FRAC_PI_2 - self.latitude.abs()).abs() < 1e-9 {
            r = 0.0;
        }
        DVec3::new(self.longitude.sin() * r, y, self.longitude.cos() * r)
    }
}

/// Angle in radians between two directions.
pub fn angular_distance(a: DVec3, b: DVec3) -> f64 {
    let a = a.normalize();
    let b = b.normalize();
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Sample the great circle from `start` to `end` as `segments + 1` points.
///
/// The path is lifted off the surface by `sin(pi * t) * altitude_scale * angle / 2`
/// (relative to `radius`), so longer arcs fly higher and both ends touch the globe.
pub fn great_circle_points(
    start: &Coordinates,
    end: &Coordinates,
    segments: usize,
    radius: f32,
    altitude_scale: f32,
) -> Vec<Vec3> {
    let segments = segments.max(1);
    let a = start.unit_vector();
    let b = end.unit_vector();
    let omega = angular_distance(a, b);

    // Direction of travel in the plane of the great circle, perpendicular to `a`
    let mut axis = a.cross(b);
    if axis.length_squared() < 1e-18 {
        // Identical or antipodal endpoints: any perpendicular plane is a great circle
        axis = if a.y.abs() < 0.9 {
            a.cross(DVec3::Y)
        } else {
            a.cross(DVec3::X)
        };
    }
    let tangent = axis.normalize().cross(a);

    let peak = altitude_scale as f64 * omega / 2.0;
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let theta = omega * t;
            let dir = a * theta.cos() + tangent * theta.sin();
            let lift = 1.0 + (PI * t).sin() * peak;
            (dir.normalize() * radius as f64 * lift).as_vec3()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_globe(coords: &Coordinates) -> Vec3 {
        coords.unit_vector().as_vec3() * GLOBE_RADIUS
    }

    #[test]
    fn test_from_degrees_rejects_out_of_range() {
        assert!(Coordinates::from_degrees(91.0, 0.0).is_err());
        assert!(Coordinates::from_degrees(0.0, -180.5).is_err());
        assert!(Coordinates::from_degrees(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_point_on_sphere_round_trip() {
        let coords = Coordinates::from_degrees(50.1213009, 8.5663531).unwrap();
        let p = on_globe(&coords);
        assert!((p.length() - GLOBE_RADIUS).abs() < 1e-3);

        let back: Coordinates = p.into();
        let (lat, lon) = back.as_degrees();
        assert!((lat - 50.1213009).abs() < 1e-3, "lat was {}", lat);
        assert!((lon - 8.5663531).abs() < 1e-3, "lon was {}", lon);
    }

    #[test]
    fn test_great_circle_endpoints_touch_surface() {
        let start = Coordinates::from_degrees(44.1274576, -122.8257181).unwrap();
        let end = Coordinates::from_degrees(1.3143394, 103.7038242).unwrap();
        let points = great_circle_points(&start, &end, 32, GLOBE_RADIUS, 0.4);

        assert_eq!(points.len(), 33);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert!(first.distance(on_globe(&start)) < 1e-2);
        assert!(last.distance(on_globe(&end)) < 1e-2);
    }

    #[test]
    fn test_great_circle_peak_altitude() {
        let start = Coordinates::from_degrees(0.0, 0.0).unwrap();
        let end = Coordinates::from_degrees(0.0, 90.0).unwrap();
        let points = great_circle_points(&start, &end, 2, GLOBE_RADIUS, 0.4);

        // Quarter circle: peak lift = 0.4 * (pi/2) / 2
        let expected = GLOBE_RADIUS * (1.0 + 0.4 * std::f32::consts::FRAC_PI_2 / 2.0);
        assert!((points[1].length() - expected).abs() < 1e-2);
        // Midpoint lies at longitude 45
        let mid: Coordinates = points[1].into();
        let (lat, lon) = mid.as_degrees();
        assert!(lat.abs() < 1e-3);
        assert!((lon - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_great_circle_antipodal_is_finite() {
        let start = Coordinates::from_degrees(0.0, 0.0).unwrap();
        let end = Coordinates::from_degrees(0.0, 180.0).unwrap();
        let points = great_circle_points(&start, &end, 16, GLOBE_RADIUS, 0.4);
        assert!(points.iter().all(|p| p.is_finite()));
        assert!(points.last().unwrap().distance(on_globe(&end)) < 1e-2);
    }
}
