//! Country hexagon overlay mesh

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::picking::Pickable;
use bevy::prelude::*;

use crate::config::HexPolygonConfig;
use crate::geography::HexOverlay;

/// Marker for the hex overlay entity under a globe widget
#[derive(Component)]
pub struct HexOverlayMesh;

pub fn hex_overlay_mesh(overlay: &HexOverlay) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_indices(Indices::U32(overlay.indices.clone()));
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, overlay.positions.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, overlay.normals.clone());
    mesh
}

/// Spawn the overlay as a child of `widget`. Empty overlays spawn nothing.
pub fn spawn_hex_overlay(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    widget: Entity,
    overlay: &HexOverlay,
    config: &HexPolygonConfig,
) {
    if overlay.is_empty() {
        return;
    }

    let material = materials.add(StandardMaterial {
        base_color: config.color,
        unlit: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(hex_overlay_mesh(overlay))),
        MeshMaterial3d(material),
        Transform::IDENTITY,
        Pickable::IGNORE,
        HexOverlayMesh,
        Name::new("Hex Overlay"),
        ChildOf(widget),
    ));
}
