//! Geography fetcher worker.

use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::{
    Arc, Mutex,
    mpsc::{self},
};
use std::thread;

use bevy::log::{info, warn};

use crate::geography::cache::{CachedGeography, GeographyCache};
use crate::geography::hexes::{HexOverlay, tessellate};
use crate::geography::types::{
    FeatureCollection, GeographyChannels, GeographyCommand, GeographyResult, GeographySource,
};

/// Start the background geography worker thread
///
/// `cache` is consulted before any HTTP request and refreshed after a
/// successful download; file sources bypass it.
pub fn start_geography_worker(cache: Option<GeographyCache>) -> GeographyChannels {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GeographyCommand>();
    let (res_tx, res_rx) = mpsc::channel::<GeographyResult>();

    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(err) => {
                warn!("[GEOGRAPHY] failed to start runtime: {}", err);
                return;
            }
        };
        rt.block_on(async move {
            let client = reqwest::Client::new();

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    GeographyCommand::Fetch {
                        source,
                        resolution,
                        margin,
                        altitude,
                    } => {
                        let res = async {
                            let body = load_document(&client, &source, cache.as_ref()).await?;
                            build_geography(&body, resolution, margin, altitude)
                        }
                        .await;

                        let msg = match res {
                            Ok((collection, overlay)) => {
                                info!(
                                    "[GEOGRAPHY] source={} features={} cells={}",
                                    source,
                                    collection.features.len(),
                                    overlay.cell_count
                                );
                                GeographyResult::Loaded {
                                    source,
                                    collection,
                                    overlay,
                                }
                            }
                            Err(err) => {
                                warn!("[GEOGRAPHY] source={} FAILURE: {:#}", source, err);
                                GeographyResult::Failed {
                                    source,
                                    error: err.to_string(),
                                }
                            }
                        };
                        let _ = res_tx.send(msg);
                    }
                }
            }
        });
    });

    GeographyChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}

async fn load_document(
    client: &reqwest::Client,
    source: &GeographySource,
    cache: Option<&GeographyCache>,
) -> Result<String> {
    match source {
        GeographySource::File(path) => read_file_source(path),
        GeographySource::Http(url) => {
            if let Some(cache) = cache {
                match cache.read(url) {
                    Ok(Some(entry)) if cache.is_valid(&entry) => {
                        info!("[GEOGRAPHY] cache hit for {}", url);
                        return Ok(entry.body);
                    }
                    Ok(_) => {}
                    Err(err) => warn!("[GEOGRAPHY] cache read failed for {}: {}", url, err),
                }
            }

            let body = fetch_body(client, url).await?;

            if let Some(cache) = cache {
                let entry = CachedGeography {
                    source: url.clone(),
                    body: body.clone(),
                    cached_at: Utc::now(),
                };
                if let Err(err) = cache.write(&entry) {
                    warn!("[GEOGRAPHY] cache write failed for {}: {}", url, err);
                }
            }
            Ok(body)
        }
    }
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        anyhow::bail!("HTTP {} for {}", status, url);
    }
    Ok(body)
}

fn read_file_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("failed to read {}: {}", path.display(), err))
}

/// Parse a FeatureCollection body and tessellate it
pub fn build_geography(
    body: &str,
    resolution: u8,
    margin: f32,
    altitude: f32,
) -> Result<(FeatureCollection, HexOverlay)> {
    let collection = parse_feature_collection(body)?;
    let overlay = tessellate(&collection.polygons(), resolution, margin, altitude)?;
    Ok((collection, overlay))
}

pub fn parse_feature_collection(body: &str) -> Result<FeatureCollection> {
    let body = body.trim_start_matches('\u{feff}');
    Ok(serde_json::from_str(body)?)
}
