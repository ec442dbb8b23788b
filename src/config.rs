//! Globe configuration resources
//!
//! One resource per concern. Defaults reproduce the stock widget look; any of
//! them can be overridden from the user's `settings.json` (see `settings`).

use bevy::prelude::*;
use std::time::Duration;

use crate::geography::GeographySource;

/// Window and globe surface appearance
#[derive(Resource, Clone, Debug)]
pub struct GlobeViewConfig {
    pub width: f32,
    pub height: f32,
    pub background_color: Color,
    pub globe_color: Color,
    /// Phong-style shininess, converted to PBR roughness at material creation
    pub shininess: f32,
}

impl Default for GlobeViewConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            background_color: Color::NONE,
            globe_color: Color::srgb_u8(0x11, 0x11, 0x11),
            shininess: 14.0,
        }
    }
}

impl GlobeViewConfig {
    pub fn roughness(&self) -> f32 {
        phong_shininess_to_roughness(self.shininess)
    }
}

/// Map a Blinn-Phong specular exponent to a perceptual roughness.
pub fn phong_shininess_to_roughness(shininess: f32) -> f32 {
    (2.0 / (shininess.max(0.0) + 2.0)).sqrt().clamp(0.089, 1.0)
}

#[derive(Resource, Clone, Debug)]
pub struct AtmosphereConfig {
    pub enabled: bool,
    pub color: Color,
    /// Shell thickness as a fraction of the globe radius
    pub altitude: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::WHITE,
            altitude: 0.1,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct HexPolygonConfig {
    /// H3 resolution used to tile the countries
    pub resolution: u8,
    /// Fraction of each cell's radius left empty around the hexagon
    pub margin: f32,
    pub color: Color,
    /// Lift above the surface as a fraction of the globe radius
    pub altitude: f32,
}

impl Default for HexPolygonConfig {
    fn default() -> Self {
        Self {
            resolution: 3,
            margin: 0.7,
            color: Color::srgb_u8(0x88, 0x88, 0x88),
            altitude: 0.001,
        }
    }
}

/// Arc drawing style. Dash lengths are fractions of the arc's own length.
#[derive(Resource, Clone, Debug)]
pub struct ArcStyleConfig {
    pub stroke: f32,
    pub altitude_auto_scale: f32,
    pub dash_length: f32,
    pub dash_gap: f32,
    pub dash_initial_gap: f32,
    /// Time for a dash to travel one full arc length
    pub dash_animate_time: Duration,
    pub segments: usize,
}

impl Default for ArcStyleConfig {
    fn default() -> Self {
        Self {
            stroke: 0.3,
            altitude_auto_scale: 0.4,
            dash_length: 0.3,
            dash_gap: 2.0,
            dash_initial_gap: 1.0,
            dash_animate_time: Duration::from_millis(3000),
            segments: 64,
        }
    }
}

/// Arc generation and refresh cadence
#[derive(Resource, Clone, Debug)]
pub struct ArcRefreshConfig {
    pub interval: Duration,
    pub arc_count: usize,
    pub arc_color: Color,
}

impl Default for ArcRefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            arc_count: 4,
            arc_color: Color::srgb_u8(0x00, 0xe9, 0xa3),
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct AutoRotateConfig {
    pub enabled: bool,
    /// OrbitControls units: 2.0 is one revolution per 30 seconds
    pub speed: f32,
    pub enable_zoom: bool,
}

impl Default for AutoRotateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.3,
            enable_zoom: false,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct GeographyConfig {
    pub source: GeographySource,
    pub use_cache: bool,
    pub cache_expiration_days: i64,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            source: GeographySource::default(),
            use_cache: true,
            cache_expiration_days: 30,
        }
    }
}

/// Every configuration resource, built once before the app starts.
#[derive(Clone, Debug, Default)]
pub struct GlobeConfigBundle {
    pub view: GlobeViewConfig,
    pub atmosphere: AtmosphereConfig,
    pub hex: HexPolygonConfig,
    pub arc_style: ArcStyleConfig,
    pub refresh: ArcRefreshConfig,
    pub rotate: AutoRotateConfig,
    pub geography: GeographyConfig,
}

impl GlobeConfigBundle {
    pub fn insert_into(self, app: &mut App) {
        app.insert_resource(self.view)
            .insert_resource(self.atmosphere)
            .insert_resource(self.hex)
            .insert_resource(self.arc_style)
            .insert_resource(self.refresh)
            .insert_resource(self.rotate)
            .insert_resource(self.geography);
    }
}
