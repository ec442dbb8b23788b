//! User settings file
//!
//! An optional `settings.json` in the platform config directory overrides any
//! of the configuration defaults. Every field is optional; colors are hex
//! strings (`#rgb`, `#rrggbb` or `#rrggbbaa`).
//!
//! - macOS: ~/Library/Application Support/arcglobe/settings.json
//! - Linux: ~/.config/arcglobe/settings.json
//! - Windows: %APPDATA%\arcglobe\config\settings.json

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::arcs::refresh::MIN_REFRESH_INTERVAL;
use crate::config::GlobeConfigBundle;
use crate::geography::GeographySource;
use crate::geography::hexes::MAX_HEX_RESOLUTION;

/// A century; anything longer is treated as a typo
pub const MAX_CACHE_EXPIRATION_DAYS: i64 = 36_500;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobeSettings {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background_color: Option<String>,
    pub globe_color: Option<String>,
    pub globe_shininess: Option<f32>,
    pub atmosphere_enabled: Option<bool>,
    pub atmosphere_color: Option<String>,
    pub atmosphere_altitude: Option<f32>,
    pub hex_resolution: Option<u8>,
    pub hex_margin: Option<f32>,
    pub hex_color: Option<String>,
    pub arc_color: Option<String>,
    pub arc_stroke: Option<f32>,
    pub arc_altitude_auto_scale: Option<f32>,
    pub arc_dash_length: Option<f32>,
    pub arc_dash_gap: Option<f32>,
    pub arc_dash_initial_gap: Option<f32>,
    pub arc_dash_animate_time_ms: Option<u64>,
    pub arc_count: Option<usize>,
    pub refresh_interval_ms: Option<u64>,
    pub auto_rotate: Option<bool>,
    pub auto_rotate_speed: Option<f32>,
    pub enable_zoom: Option<bool>,
    pub geography_source: Option<String>,
    pub geography_cache: Option<bool>,
    pub cache_expiration_days: Option<i64>,
}

impl GlobeSettings {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "arcglobe").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Returns Ok(None) when the file does not exist
    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let settings = Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(Some(settings))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Validate and copy every present field into `bundle`.
    ///
    /// On error `bundle` is left untouched.
    pub fn apply(&self, bundle: &mut GlobeConfigBundle) -> anyhow::Result<()> {
        let mut next = bundle.clone();

        if let Some(width) = self.width {
            next.view.width = positive("width", width)?;
        }
        if let Some(height) = self.height {
            next.view.height = positive("height", height)?;
        }
        if let Some(color) = &self.background_color {
            next.view.background_color = parse_color("background_color", color)?;
        }
        if let Some(color) = &self.globe_color {
            next.view.globe_color = parse_color("globe_color", color)?;
        }
        if let Some(shininess) = self.globe_shininess {
            next.view.shininess = non_negative("globe_shininess", shininess)?;
        }

        if let Some(enabled) = self.atmosphere_enabled {
            next.atmosphere.enabled = enabled;
        }
        if let Some(color) = &self.atmosphere_color {
            next.atmosphere.color = parse_color("atmosphere_color", color)?;
        }
        if let Some(altitude) = self.atmosphere_altitude {
            next.atmosphere.altitude = non_negative("atmosphere_altitude", altitude)?;
        }

        if let Some(resolution) = self.hex_resolution {
            if resolution > MAX_HEX_RESOLUTION {
                anyhow::bail!(
                    "hex_resolution must be at most {}, got {}",
                    MAX_HEX_RESOLUTION,
                    resolution
                );
            }
            next.hex.resolution = resolution;
        }
        if let Some(margin) = self.hex_margin {
            if !(0.0..1.0).contains(&margin) {
                anyhow::bail!("hex_margin must be in [0, 1), got {}", margin);
            }
            next.hex.margin = margin;
        }
        if let Some(color) = &self.hex_color {
            next.hex.color = parse_color("hex_color", color)?;
        }

        if let Some(color) = &self.arc_color {
            next.refresh.arc_color = parse_color("arc_color", color)?;
        }
        if let Some(stroke) = self.arc_stroke {
            next.arc_style.stroke = positive("arc_stroke", stroke)?;
        }
        if let Some(scale) = self.arc_altitude_auto_scale {
            next.arc_style.altitude_auto_scale = non_negative("arc_altitude_auto_scale", scale)?;
        }
        if let Some(length) = self.arc_dash_length {
            next.arc_style.dash_length = positive("arc_dash_length", length)?;
        }
        if let Some(gap) = self.arc_dash_gap {
            next.arc_style.dash_gap = non_negative("arc_dash_gap", gap)?;
        }
        if let Some(gap) = self.arc_dash_initial_gap {
            next.arc_style.dash_initial_gap = non_negative("arc_dash_initial_gap", gap)?;
        }
        if let Some(ms) = self.arc_dash_animate_time_ms {
            next.arc_style.dash_animate_time = Duration::from_millis(ms);
        }
        if let Some(count) = self.arc_count {
            if count == 0 {
                anyhow::bail!("arc_count must be at least 1");
            }
            next.refresh.arc_count = count;
        }
        if let Some(ms) = self.refresh_interval_ms {
            let interval = Duration::from_millis(ms);
            if interval < MIN_REFRESH_INTERVAL {
                anyhow::bail!(
                    "refresh_interval_ms must be at least {}, got {}",
                    MIN_REFRESH_INTERVAL.as_millis(),
                    ms
                );
            }
            next.refresh.interval = interval;
        }

        if let Some(enabled) = self.auto_rotate {
            next.rotate.enabled = enabled;
        }
        if let Some(speed) = self.auto_rotate_speed {
            next.rotate.speed = speed;
        }
        if let Some(enabled) = self.enable_zoom {
            next.rotate.enable_zoom = enabled;
        }

        if let Some(source) = &self.geography_source {
            if source.trim().is_empty() {
                anyhow::bail!("geography_source must not be empty");
            }
            next.geography.source = GeographySource::parse(source);
        }
        if let Some(enabled) = self.geography_cache {
            next.geography.use_cache = enabled;
        }
        if let Some(days) = self.cache_expiration_days {
            if !(1..=MAX_CACHE_EXPIRATION_DAYS).contains(&days) {
                anyhow::bail!(
                    "cache_expiration_days must be in 1..={}, got {}",
                    MAX_CACHE_EXPIRATION_DAYS,
                    days
                );
            }
            next.geography.cache_expiration_days = days;
        }

        *bundle = next;
        Ok(())
    }
}

fn parse_color(field: &str, value: &str) -> anyhow::Result<Color> {
    Srgba::hex(value)
        .map(Color::from)
        .map_err(|err| anyhow::anyhow!("{} is not a hex color ({:?}): {}", field, value, err))
}

fn positive(field: &str, value: f32) -> anyhow::Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        anyhow::bail!("{} must be positive, got {}", field, value)
    }
}

fn non_negative(field: &str, value: f32) -> anyhow::Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        anyhow::bail!("{} must not be negative, got {}", field, value)
    }
}

/// Outcome of reading the settings file, held until logging is up
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum SettingsReport {
    #[default]
    NoFile,
    Loaded(PathBuf),
    Ignored(String),
}

/// Defaults overlaid with the user's settings file. A bad file keeps the
/// defaults; the returned report says what happened.
pub fn load_config_bundle() -> (GlobeConfigBundle, SettingsReport) {
    match GlobeSettings::default_path() {
        Some(path) => load_config_bundle_from(&path),
        None => (GlobeConfigBundle::default(), SettingsReport::NoFile),
    }
}

pub fn load_config_bundle_from(path: &Path) -> (GlobeConfigBundle, SettingsReport) {
    let mut bundle = GlobeConfigBundle::default();
    let report = match GlobeSettings::load_from(path) {
        Ok(Some(settings)) => match settings.apply(&mut bundle) {
            Ok(()) => SettingsReport::Loaded(path.to_path_buf()),
            Err(err) => SettingsReport::Ignored(format!("{}: {:#}", path.display(), err)),
        },
        Ok(None) => SettingsReport::NoFile,
        Err(err) => SettingsReport::Ignored(format!("{:#}", err)),
    };
    (bundle, report)
}

pub fn log_settings_report(report: Res<SettingsReport>) {
    match report.as_ref() {
        SettingsReport::NoFile => {}
        SettingsReport::Loaded(path) => info!("[INIT] Loaded settings from {}", path.display()),
        SettingsReport::Ignored(reason) => warn!("Ignoring settings file {}", reason),
    }
}
