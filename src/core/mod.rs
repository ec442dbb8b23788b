//! Core module
//!
//! Coordinate math and the orbit camera shared by the rest of the crate.

pub mod coordinates;
pub mod orbit_camera;

pub use orbit_camera::OrbitCameraPlugin;
