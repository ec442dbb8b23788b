//! Globe widget lifecycle
//!
//! Mounting spawns the widget entity that owns the arc set and its refresh
//! loop; the visualization and geography plugins attach their children when
//! they see a new widget. Unmounting despawns the entity and everything under
//! it, which releases the refresh timer. Press `M` to toggle.

use bevy::prelude::*;

use crate::arcs::{ArcGenerator, ArcRefresh, ArcRng, ArcSet};
use crate::config::ArcRefreshConfig;

/// Marker for the root entity of a mounted globe
#[derive(Component)]
pub struct GlobeWidget;

pub struct WidgetPlugin;

impl Plugin for WidgetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, mount_globe)
            .add_systems(Update, toggle_globe_mount);
    }
}

/// Components of a freshly mounted widget, with its tick-0 arc set
pub fn widget_components(
    rng: &mut ArcRng,
    config: &ArcRefreshConfig,
) -> (GlobeWidget, ArcSet, ArcRefresh, Transform, Visibility, Name) {
    let refresh = ArcRefresh::new(
        config.interval,
        ArcGenerator::new(config.arc_count, config.arc_color),
    );
    let arc_set = refresh.initial_set(&mut rng.0);
    (
        GlobeWidget,
        arc_set,
        refresh,
        Transform::IDENTITY,
        Visibility::Visible,
        Name::new("Globe"),
    )
}

pub fn mount_globe(
    mut commands: Commands,
    mut rng: ResMut<ArcRng>,
    config: Res<ArcRefreshConfig>,
) {
    spawn_globe(&mut commands, &mut rng, &config);
}

fn spawn_globe(commands: &mut Commands, rng: &mut ArcRng, config: &ArcRefreshConfig) -> Entity {
    let components = widget_components(rng, config);
    let interval = components.2.interval();
    let widget = commands.spawn(components).id();
    info!(
        "Globe mounted ({:?}), refreshing {} arcs every {:?}",
        widget, config.arc_count, interval
    );
    widget
}

pub fn unmount_globe(commands: &mut Commands, widget: Entity) {
    commands.entity(widget).despawn();
    info!("Globe unmounted ({:?})", widget);
}

fn toggle_globe_mount(
    input: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    mut rng: ResMut<ArcRng>,
    config: Res<ArcRefreshConfig>,
    widgets: Query<Entity, With<GlobeWidget>>,
) {
    if !input.just_pressed(KeyCode::KeyM) {
        return;
    }

    if widgets.is_empty() {
        spawn_globe(&mut commands, &mut rng, &config);
        return;
    }
    for widget in &widgets {
        unmount_globe(&mut commands, widget);
    }
}
