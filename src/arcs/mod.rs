//! Arc generation module
//!
//! Produces the batch of region-to-random-point arcs shown on the globe and
//! replaces it on a fixed interval for as long as the globe widget is mounted.

use bevy::prelude::*;

pub mod generator;
pub mod refresh;
pub mod types;

pub use generator::{ArcGenerator, ArcRng};
pub use refresh::{ArcRefresh, log_arc_refreshes, refresh_arc_sets};
pub use types::{ArcSet, ArcSetRefreshed, GlobeArc};

/// Plugin for arc generation and the refresh loop
pub struct ArcsPlugin;

impl Plugin for ArcsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArcRng>()
            .add_message::<ArcSetRefreshed>()
            .add_systems(Update, (refresh_arc_sets, log_arc_refreshes).chain());
    }
}
