//! Geography module
//!
//! Loads the country outlines once per mount on a background worker (HTTP or
//! file, with an on-disk cache), tessellates them into hexagons and hands the
//! result to the globe.

use bevy::prelude::*;

pub mod cache;
pub mod fetcher;
pub mod hexes;
pub mod systems;
pub mod types;

pub use hexes::HexOverlay;
pub use systems::{apply_geography_results, request_geography_for_new_widgets};
pub use types::{GeographyData, GeographySource};

/// Plugin for geography loading
pub struct GeographyPlugin;

impl Plugin for GeographyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GeographyData>()
            .add_systems(Startup, systems::setup_geography_worker)
            .add_systems(
                Update,
                (request_geography_for_new_widgets, apply_geography_results).chain(),
            );
    }
}
