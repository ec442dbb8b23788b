use bevy::picking::prelude::*;
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{RenderCreation, WgpuSettings};
use bevy::window::{PresentMode, Window, WindowPlugin, WindowResolution};

use bevy_panorbit_camera::PanOrbitCameraPlugin;

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod arcs;
mod config;
mod core;
mod geography;
mod settings;
mod visualization;
mod widget;

use arcs::ArcsPlugin;
use core::OrbitCameraPlugin;
use geography::GeographyPlugin;
use visualization::VisualizationPlugin;
use widget::WidgetPlugin;

fn main() {
    let (config, settings_report) = settings::load_config_bundle();
    let mut app = App::new();

    // Transparent unless the background color says otherwise
    let transparent = config.view.background_color.alpha() < 1.0;

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Arc Globe".to_string(),
                    resolution: WindowResolution::new(
                        config.view.width as u32,
                        config.view.height as u32,
                    ),
                    transparent,
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(RenderPlugin {
                render_creation: RenderCreation::Automatic(WgpuSettings { ..default() }),
                ..default()
            }),
    );

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Logging only exists once DefaultPlugins are in
    config.insert_into(&mut app);
    app.insert_resource(settings_report)
        .add_systems(Startup, settings::log_settings_report);

    app.add_plugins(PanOrbitCameraPlugin);
    app.add_plugins(MeshPickingPlugin);

    app.add_plugins(OrbitCameraPlugin);
    app.add_plugins(ArcsPlugin);
    app.add_plugins(GeographyPlugin);
    app.add_plugins(VisualizationPlugin);
    app.add_plugins(WidgetPlugin);

    app.run();
}
