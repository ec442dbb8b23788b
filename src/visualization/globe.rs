//! Globe surface and atmosphere

use bevy::picking::Pickable;
use bevy::prelude::*;
use bevy::render::render_resource::Face;

use crate::config::{AtmosphereConfig, GlobeViewConfig};
use crate::core::coordinates::{Coordinates, GLOBE_RADIUS};
use crate::widget::GlobeWidget;

#[derive(Component)]
pub struct GlobeSurface;

#[derive(Component)]
pub struct Atmosphere;

/// Give every newly mounted widget its sphere and atmosphere shell
pub fn attach_globe_surface(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    view: Res<GlobeViewConfig>,
    atmosphere: Res<AtmosphereConfig>,
    new_widgets: Query<Entity, Added<GlobeWidget>>,
) {
    for widget in &new_widgets {
        let material = materials.add(StandardMaterial {
            base_color: view.globe_color,
            perceptual_roughness: view.roughness(),
            metallic: 0.0,
            ..default()
        });

        commands
            .spawn((
                Mesh3d(meshes.add(Sphere::new(GLOBE_RADIUS).mesh().uv(96, 48))),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                GlobeSurface,
                Name::new("Globe Surface"),
                ChildOf(widget),
            ))
            .observe(|mut event: On<Pointer<Click>>| {
                if let Some(pos) = event.hit.position {
                    let coords: Coordinates = pos.into();
                    let (lat, lon) = coords.as_degrees();
                    info!("Globe clicked at Lat: {:.4}, Lon: {:.4}", lat, lon);
                }
                event.propagate(false);
            });

        if atmosphere.enabled && atmosphere.altitude > 0.0 {
            let shell_radius = GLOBE_RADIUS * (1.0 + atmosphere.altitude);
            let material = materials.add(StandardMaterial {
                base_color: atmosphere.color.with_alpha(0.12),
                unlit: true,
                alpha_mode: AlphaMode::Add,
                // Only the far side of the shell is drawn, so it reads as a rim around the globe
                cull_mode: Some(Face::Front),
                ..default()
            });
            commands.spawn((
                Mesh3d(meshes.add(Sphere::new(shell_radius).mesh().uv(96, 48))),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                Pickable::IGNORE,
                Atmosphere,
                Name::new("Atmosphere"),
                ChildOf(widget),
            ));
        }
    }
}
