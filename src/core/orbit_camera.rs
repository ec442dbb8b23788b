//! Orbit camera around the globe with OrbitControls-style auto-rotation.
//!
//! `bevy_panorbit_camera` handles user input; this module spawns the camera
//! with zoom and pan locked and nudges its yaw every frame while auto-rotate
//! is enabled.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use std::f32::consts::TAU;

use crate::config::{AutoRotateConfig, GlobeViewConfig};
use crate::core::coordinates::GLOBE_RADIUS;

/// Camera distance from the globe centre, in globe radii
const CAMERA_DISTANCE_RADII: f32 = 3.5;

#[derive(Component)]
pub struct MainCamera;

pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_main_camera)
            .add_systems(Update, auto_rotate_camera);
    }
}

/// Angular speed in rad/s for an OrbitControls `autoRotateSpeed`.
///
/// OrbitControls turns `2π / 60 / 60 * speed` per frame at 60 fps.
pub fn auto_rotate_rate(speed: f32) -> f32 {
    TAU / 60.0 * speed
}

fn spawn_main_camera(
    mut commands: Commands,
    view: Res<GlobeViewConfig>,
    rotate: Res<AutoRotateConfig>,
) {
    commands.insert_resource(GlobalAmbientLight {
        brightness: 400.0,
        ..default()
    });

    let distance = GLOBE_RADIUS * CAMERA_DISTANCE_RADII;
    let zoom_sensitivity = if rotate.enable_zoom { 1.0 } else { 0.0 };

    commands
        .spawn((
            Camera3d::default(),
            Camera {
                order: 0,
                clear_color: ClearColorConfig::Custom(view.background_color),
                ..default()
            },
            PanOrbitCamera {
                focus: Vec3::ZERO,
                radius: Some(distance),
                yaw: Some(0.0),
                pitch: Some(0.0),
                zoom_sensitivity,
                pan_sensitivity: 0.0,
                force_update: true,
                ..default()
            },
            MainCamera,
            Tonemapping::TonyMcMapface,
            Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y),
        ))
        .with_children(|camera| {
            // Headlight: keeps the lit side facing the viewer while the camera orbits
            camera.spawn((
                DirectionalLight {
                    illuminance: 6_000.0,
                    ..default()
                },
                Transform::from_xyz(-1.0, 1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
            ));
        });
}

fn auto_rotate_camera(
    time: Res<Time>,
    config: Res<AutoRotateConfig>,
    mut cameras: Query<&mut PanOrbitCamera, With<MainCamera>>,
) {
    if !config.enabled {
        return;
    }
    let step = auto_rotate_rate(config.speed) * time.delta_secs();
    for mut camera in &mut cameras {
        // Decreasing yaw orbits the camera westward, so the globe appears to turn eastward
        camera.target_yaw -= step;
    }
}
