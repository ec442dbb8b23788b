//! Animated dashed arcs drawn with gizmos
//!
//! Each arc is sampled once per arc set; every frame only the dash windows
//! currently on the arc are drawn. Dash positions are fractions of the arc's
//! length, so short and long arcs animate at the same relative pace.

use bevy::prelude::*;
use std::time::Duration;

use crate::arcs::{ArcSet, GlobeArc};
use crate::config::ArcStyleConfig;
use crate::core::coordinates::{CoordError, Coordinates, GLOBE_RADIUS, great_circle_points};
use crate::widget::GlobeWidget;

/// Pixels of gizmo line width per world unit of stroke
const STROKE_PIXELS_PER_UNIT: f32 = 10.0;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct ArcGizmos;

/// Sampled paths for a widget's current arc set
#[derive(Component, Default)]
pub struct ArcPaths {
    generation: Option<u64>,
    /// Time since the current set landed; drives the dash animation
    elapsed: Duration,
    paths: Vec<ArcPath>,
}

#[derive(Debug, Clone)]
pub struct ArcPath {
    points: Vec<Vec3>,
    /// Normalized arc length at each point, 0.0 at the start and 1.0 at the end
    stations: Vec<f32>,
    color: Color,
}

impl ArcPath {
    pub fn new(arc: &GlobeArc, style: &ArcStyleConfig) -> Result<Self, CoordError> {
        let start = Coordinates::from_degrees(arc.start_lat, arc.start_lng)?;
        let end = Coordinates::from_degrees(arc.end_lat, arc.end_lng)?;
        let points = great_circle_points(
            &start,
            &end,
            style.segments,
            GLOBE_RADIUS,
            style.altitude_auto_scale,
        );

        let mut stations = Vec::with_capacity(points.len());
        let mut total = 0.0;
        stations.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            stations.push(total);
        }
        if total > 0.0 {
            for s in &mut stations {
                *s /= total;
            }
        }

        Ok(Self {
            points,
            stations,
            color: arc.color,
        })
    }

    /// Points covering the normalized range `[from, to]`
    pub fn slice(&self, from: f32, to: f32) -> Vec<Vec3> {
        let mut out = Vec::new();
        if to <= from || self.points.len() < 2 {
            return out;
        }
        out.push(self.point_at(from));
        for (point, station) in self.points.iter().zip(&self.stations) {
            if *station > from && *station < to {
                out.push(*point);
            }
        }
        out.push(self.point_at(to));
        out
    }

    fn point_at(&self, s: f32) -> Vec3 {
        let s = s.clamp(0.0, 1.0);
        let idx = self.stations.partition_point(|&x| x < s);
        if idx == 0 {
            return self.points[0];
        }
        if idx >= self.points.len() {
            return self.points[self.points.len() - 1];
        }
        let (s0, s1) = (self.stations[idx - 1], self.stations[idx]);
        let t = if s1 > s0 { (s - s0) / (s1 - s0) } else { 0.0 };
        self.points[idx - 1].lerp(self.points[idx], t)
    }
}

/// Visible dash intervals on `[0, 1]` after the dashes have travelled `phase` arc lengths.
///
/// Dashes repeat every `length + gap`; the first one starts `initial_gap` before the
/// arc's start point.
pub fn dash_windows(length: f32, gap: f32, initial_gap: f32, phase: f32) -> Vec<(f32, f32)> {
    let mut windows = Vec::new();
    let period = length + gap;
    if length <= 0.0 || period <= 0.0 {
        return windows;
    }
    let mut start = (phase - initial_gap).rem_euclid(period) - period;
    while start < 1.0 {
        let from = start.max(0.0);
        let to = (start + length).min(1.0);
        if to > from {
            windows.push((from, to));
        }
        start += period;
    }
    windows
}

pub fn configure_arc_gizmos(mut store: ResMut<GizmoConfigStore>, style: Res<ArcStyleConfig>) {
    let (config, _) = store.config_mut::<ArcGizmos>();
    config.line.width = (style.stroke * STROKE_PIXELS_PER_UNIT).max(1.0);
}

pub fn attach_arc_paths(mut commands: Commands, new_widgets: Query<Entity, Added<GlobeWidget>>) {
    for widget in &new_widgets {
        commands.entity(widget).insert(ArcPaths::default());
    }
}

/// Resample paths when the arc set changed and restart the dash clock
pub fn sync_arc_paths(
    time: Res<Time>,
    style: Res<ArcStyleConfig>,
    mut widgets: Query<(&ArcSet, &mut ArcPaths)>,
) {
    for (arc_set, mut paths) in &mut widgets {
        if paths.generation == Some(arc_set.generation) {
            paths.elapsed += time.delta();
            continue;
        }
        paths.paths = arc_set
            .arcs
            .iter()
            .filter_map(|arc| match ArcPath::new(arc, &style) {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("Skipping arc: {}", err);
                    None
                }
            })
            .collect();
        paths.generation = Some(arc_set.generation);
        paths.elapsed = Duration::ZERO;
    }
}

pub fn draw_arc_dashes(
    mut gizmos: Gizmos<ArcGizmos>,
    style: Res<ArcStyleConfig>,
    widgets: Query<&ArcPaths>,
) {
    let animate = style.dash_animate_time.as_secs_f32();
    for paths in &widgets {
        let phase = if animate > 0.0 {
            paths.elapsed.as_secs_f32() / animate
        } else {
            0.0
        };
        let windows = dash_windows(
            style.dash_length,
            style.dash_gap,
            style.dash_initial_gap,
            phase,
        );
        for path in &paths.paths {
            for (from, to) in &windows {
                gizmos.linestrip(path.slice(*from, *to), path.color);
            }
        }
    }
}
