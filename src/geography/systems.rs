//! Geography systems (request + apply).

use bevy::prelude::*;
use std::sync::mpsc::TryRecvError;

use crate::config::{GeographyConfig, HexPolygonConfig};
use crate::geography::cache::GeographyCache;
use crate::geography::fetcher::start_geography_worker;
use crate::geography::types::{
    FeatureCollection, GeographyChannels, GeographyCommand, GeographyData, GeographyResult,
    GeographyStatus,
};
use crate::visualization::hex_overlay::spawn_hex_overlay;
use crate::widget::GlobeWidget;

pub fn setup_geography_worker(mut commands: Commands, config: Res<GeographyConfig>) {
    let cache = if config.use_cache {
        match GeographyCache::new(config.cache_expiration_days) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!("Geography cache disabled: {}", err);
                None
            }
        }
    } else {
        None
    };
    let channels = start_geography_worker(cache);
    info!("[INIT] Geography worker started");
    commands.insert_resource(channels);
}

/// Kick off a load for each newly mounted widget, or reuse what is already loaded
pub fn request_geography_for_new_widgets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    new_widgets: Query<Entity, Added<GlobeWidget>>,
    config: Res<GeographyConfig>,
    hex: Res<HexPolygonConfig>,
    mut data: ResMut<GeographyData>,
    channels: Option<Res<GeographyChannels>>,
) {
    for widget in &new_widgets {
        match data.status {
            GeographyStatus::Loaded { .. } => {
                debug!(
                    "Reusing loaded geography ({} features) for {:?}",
                    data.collection.features.len(),
                    widget
                );
                if let Some(overlay) = data.overlay.as_ref() {
                    spawn_hex_overlay(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        widget,
                        overlay,
                        &hex,
                    );
                }
            }
            GeographyStatus::Pending => {}
            GeographyStatus::Idle | GeographyStatus::Failed(_) => {
                let Some(channels) = channels.as_ref() else {
                    warn!("Geography worker not running; globe has no country overlay");
                    continue;
                };
                let cmd = GeographyCommand::Fetch {
                    source: config.source.clone(),
                    resolution: hex.resolution,
                    margin: hex.margin,
                    altitude: hex.altitude,
                };
                if let Err(err) = channels.cmd_tx.send(cmd) {
                    warn!(
                        "Failed to queue geography fetch: {}; continuing without country overlay",
                        err
                    );
                    data.status = GeographyStatus::Failed(format!(
                        "Failed to queue geography fetch: {}",
                        err
                    ));
                } else {
                    data.status = GeographyStatus::Pending;
                }
            }
        }
    }
}

/// Drain worker results. Anything arriving while no globe is mounted is dropped.
pub fn apply_geography_results(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    hex: Res<HexPolygonConfig>,
    mut data: ResMut<GeographyData>,
    widgets: Query<Entity, With<GlobeWidget>>,
    channels: Option<Res<GeographyChannels>>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.res_rx.lock() else {
        return;
    };

    loop {
        let msg = match guard.try_recv() {
            Ok(msg) => msg,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                // Only a pending request is left hanging by a dead worker
                if data.status == GeographyStatus::Pending {
                    warn!("Geography worker stopped; continuing without country overlay");
                    data.collection = FeatureCollection::default();
                    data.overlay = None;
                    data.status =
                        GeographyStatus::Failed("geography worker stopped".to_string());
                }
                break;
            }
        };

        if widgets.is_empty() {
            debug!("Discarding geography result: no globe mounted");
            *data = GeographyData::default();
            continue;
        }

        match msg {
            GeographyResult::Loaded {
                source,
                collection,
                overlay,
            } => {
                info!(
                    "Geography loaded from {}: {} features, {} hex cells",
                    source,
                    collection.features.len(),
                    overlay.cell_count
                );
                for widget in &widgets {
                    spawn_hex_overlay(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        widget,
                        &overlay,
                        &hex,
                    );
                }
                data.status = GeographyStatus::Loaded {
                    features: collection.features.len(),
                    cells: overlay.cell_count,
                };
                data.collection = collection;
                data.overlay = Some(overlay);
            }
            GeographyResult::Failed { source, error } => {
                warn!(
                    "Geography unavailable from {} ({}); continuing without country overlay",
                    source, error
                );
                data.collection = FeatureCollection::default();
                data.overlay = None;
                data.status = GeographyStatus::Failed(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::fetcher::build_geography;
    use crate::geography::types::GeographySource;
    use crate::visualization::hex_overlay::HexOverlayMesh;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};

    const SQUARE: &str = r#"{ "features": [ { "geometry": { "type": "Polygon",
        "coordinates": [[[-10, -10], [10, -10], [10, 10], [-10, 10], [-10, -10]]] } } ] }"#;

    struct FakeWorker {
        cmd_rx: Receiver<GeographyCommand>,
        res_tx: Sender<GeographyResult>,
    }

    fn test_app() -> (App, FakeWorker) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();

        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<GeographyData>()
            .insert_resource(GeographyConfig::default())
            .insert_resource(HexPolygonConfig::default())
            .insert_resource(GeographyChannels {
                cmd_tx,
                res_rx: Arc::new(Mutex::new(res_rx)),
            })
            .add_systems(
                Update,
                (request_geography_for_new_widgets, apply_geography_results).chain(),
            );
        (app, FakeWorker { cmd_rx, res_tx })
    }

    fn loaded() -> GeographyResult {
        let (collection, overlay) = build_geography(SQUARE, 2, 0.7, 0.001).unwrap();
        GeographyResult::Loaded {
            source: GeographySource::default(),
            collection,
            overlay,
        }
    }

    fn overlay_count(app: &mut App) -> usize {
        let mut query = app.world_mut().query::<&HexOverlayMesh>();
        query.iter(app.world()).count()
    }

    #[test]
    fn test_mount_requests_once_and_applies_result() {
        let (mut app, worker) = test_app();
        app.world_mut().spawn(GlobeWidget);
        app.update();

        assert!(matches!(
            worker.cmd_rx.try_recv(),
            Ok(GeographyCommand::Fetch { resolution: 3, .. })
        ));
        assert_eq!(app.world().resource::<GeographyData>().status, GeographyStatus::Pending);

        // A second widget while pending does not queue another fetch
        app.world_mut().spawn(GlobeWidget);
        app.update();
        assert!(worker.cmd_rx.try_recv().is_err());

        worker.res_tx.send(loaded()).unwrap();
        app.update();
        let data = app.world().resource::<GeographyData>();
        assert!(matches!(data.status, GeographyStatus::Loaded { features: 1, .. }));
        assert_eq!(data.collection.features.len(), 1);
        assert_eq!(overlay_count(&mut app), 2);
    }

    #[test]
    fn test_failure_falls_back_to_empty_collection() {
        let (mut app, worker) = test_app();
        app.world_mut().spawn(GlobeWidget);
        app.update();

        worker
            .res_tx
            .send(GeographyResult::Failed {
                source: GeographySource::default(),
                error: "HTTP 404".to_string(),
            })
            .unwrap();
        app.update();

        let data = app.world().resource::<GeographyData>();
        assert_eq!(data.status, GeographyStatus::Failed("HTTP 404".to_string()));
        assert!(data.collection.features.is_empty());
        assert!(data.overlay.is_none());
        assert_eq!(overlay_count(&mut app), 0);
    }

    #[test]
    fn test_result_after_unmount_is_discarded() {
        let (mut app, worker) = test_app();
        let widget = app.world_mut().spawn(GlobeWidget).id();
        app.update();
        app.world_mut().despawn(widget);

        worker.res_tx.send(loaded()).unwrap();
        app.update();

        let data = app.world().resource::<GeographyData>();
        assert_eq!(data.status, GeographyStatus::Idle);
        assert!(data.collection.features.is_empty());
        assert_eq!(overlay_count(&mut app), 0);
    }

    #[test]
    fn test_stopped_worker_falls_back_to_empty_collection() {
        let (mut app, worker) = test_app();
        app.world_mut().spawn(GlobeWidget);
        app.update();
        assert_eq!(app.world().resource::<GeographyData>().status, GeographyStatus::Pending);

        // Worker thread gone before answering
        drop(worker);
        app.update();

        let data = app.world().resource::<GeographyData>();
        assert!(matches!(data.status, GeographyStatus::Failed(_)));
        assert!(data.collection.features.is_empty());
        assert!(data.overlay.is_none());
        assert_eq!(overlay_count(&mut app), 0);

        // A later mount cannot queue a fetch either
        app.world_mut().spawn(GlobeWidget);
        app.update();
        let status = &app.world().resource::<GeographyData>().status;
        assert!(
            matches!(status, GeographyStatus::Failed(reason) if reason.contains("queue")),
            "status was {:?}",
            status
        );
    }

    #[test]
    fn test_remount_reuses_loaded_geography() {
        let (mut app, worker) = test_app();
        let first = app.world_mut().spawn(GlobeWidget).id();
        app.update();
        let _ = worker.cmd_rx.try_recv();
        worker.res_tx.send(loaded()).unwrap();
        app.update();

        app.world_mut().despawn(first);
        app.world_mut().spawn(GlobeWidget);
        app.update();

        assert!(worker.cmd_rx.try_recv().is_err());
        assert_eq!(overlay_count(&mut app), 1);
    }
}
