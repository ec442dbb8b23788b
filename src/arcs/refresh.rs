//! Periodic arc refresh
//!
//! The refresh loop lives in an `ArcRefresh` component on the globe widget, so
//! the timer is released together with the widget: removing the component or
//! despawning the widget stops all further updates.

use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use crate::arcs::generator::{ArcGenerator, ArcRng};
use crate::arcs::types::{ArcSet, ArcSetRefreshed, region_at};

/// Shortest accepted refresh interval
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Component, Debug)]
pub struct ArcRefresh {
    timer: Timer,
    generator: ArcGenerator,
    generation: u64,
}

impl ArcRefresh {
    pub fn new(interval: Duration, generator: ArcGenerator) -> Self {
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            generator,
            generation: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.timer.duration()
    }

    /// The set shown at tick 0, before the first interval elapses
    pub fn initial_set<R: Rng>(&self, rng: &mut R) -> ArcSet {
        let mut set = self.generator.generate_arc_set(rng);
        set.generation = self.generation;
        set
    }

    /// Advance the loop by `delta`, calling `on_update` once per elapsed interval.
    ///
    /// Returns the number of updates delivered.
    pub fn tick<R: Rng>(
        &mut self,
        delta: Duration,
        rng: &mut R,
        mut on_update: impl FnMut(ArcSet),
    ) -> u32 {
        self.timer.tick(delta);
        let fired = self.timer.times_finished_this_tick();
        for _ in 0..fired {
            self.generation += 1;
            let mut set = self.generator.generate_arc_set(rng);
            set.generation = self.generation;
            on_update(set);
        }
        fired
    }
}

/// Swap in a fresh arc set on every widget whose refresh interval elapsed
pub fn refresh_arc_sets(
    time: Res<Time>,
    mut rng: ResMut<ArcRng>,
    mut widgets: Query<(Entity, &mut ArcRefresh, &mut ArcSet)>,
    mut refreshed: MessageWriter<ArcSetRefreshed>,
) {
    let delta = time.delta();
    for (widget, mut refresh, mut arc_set) in &mut widgets {
        refresh.tick(delta, &mut rng.0, |set| {
            let generation = set.generation;
            *arc_set = set;
            refreshed.write(ArcSetRefreshed { widget, generation });
        });
    }
}

pub fn log_arc_refreshes(mut refreshed: MessageReader<ArcSetRefreshed>, sets: Query<&ArcSet>) {
    for msg in refreshed.read() {
        let Ok(set) = sets.get(msg.widget) else {
            continue;
        };
        let origins: Vec<&str> = set
            .arcs
            .iter()
            .map(|arc| region_at(arc.start_lat, arc.start_lng).map_or("?", |r| r.name))
            .collect();
        debug!(
            "Arc set {} on {:?} from {}",
            msg.generation,
            msg.widget,
            origins.join(", ")
        );
    }
}
