//! Visualization module
//!
//! Globe surface, atmosphere, country hexagons and the animated arcs.

use bevy::prelude::*;

pub mod arcs;
pub mod globe;
pub mod hex_overlay;

pub use arcs::ArcGizmos;

/// Plugin for visualization systems
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<ArcGizmos>()
            .add_systems(Startup, arcs::configure_arc_gizmos)
            .add_systems(
                Update,
                (
                    globe::attach_globe_surface,
                    arcs::attach_arc_paths,
                    (arcs::sync_arc_paths, arcs::draw_arc_dashes)
                        .chain()
                        .after(crate::arcs::refresh_arc_sets),
                ),
            );
    }
}
