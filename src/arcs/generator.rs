//! Random arc generation

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arcs::types::{ArcSet, GlobeArc, REGIONS, Region};

/// Random source for arc generation. Insert a seeded one for reproducible arcs.
#[derive(Resource)]
pub struct ArcRng(pub StdRng);

impl Default for ArcRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl ArcRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

#[derive(Debug, Clone)]
pub struct ArcGenerator {
    regions: &'static [Region],
    arc_count: usize,
    color: Color,
}

impl ArcGenerator {
    pub fn new(arc_count: usize, color: Color) -> Self {
        Self {
            regions: &REGIONS,
            arc_count,
            color,
        }
    }

    /// Build `arc_count` arcs, each from a uniformly chosen region (with
    /// replacement) to a uniform point with lat in [-90, 90) and lng in [-180, 180).
    pub fn generate_arc_set<R: Rng>(&self, rng: &mut R) -> ArcSet {
        let arcs = (0..self.arc_count)
            .map(|_| {
                let region = &self.regions[rng.gen_range(0..self.regions.len())];
                GlobeArc {
                    start_lat: region.lat,
                    start_lng: region.lng,
                    end_lat: (rng.r#gen::<f64>() - 0.5) * 180.0,
                    end_lng: (rng.r#gen::<f64>() - 0.5) * 360.0,
                    color: self.color,
                }
            })
            .collect();
        ArcSet {
            generation: 0,
            arcs,
        }
    }
}

impl Default for ArcGenerator {
    fn default() -> Self {
        Self::new(4, Color::srgb_u8(0x00, 0xe9, 0xa3))
    }
}
