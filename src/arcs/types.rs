//! Arc data types

use bevy::prelude::*;

/// A fixed arc origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// Data-center regions used as arc origins
pub const REGIONS: [Region; 5] = [
    Region {
        name: "oregon",
        lat: 44.1274576,
        lng: -122.8257181,
    },
    Region {
        name: "n_virginia",
        lat: 37.4784129,
        lng: -76.4618534,
    },
    Region {
        name: "sao_paulo",
        lat: -23.6820347,
        lng: -46.735724,
    },
    Region {
        name: "singapore",
        lat: 1.3143394,
        lng: 103.7038242,
    },
    Region {
        name: "frankfurt",
        lat: 50.1213009,
        lng: 8.5663531,
    },
];

/// The region an arc starting at (`lat`, `lng`) comes from
pub fn region_at(lat: f64, lng: f64) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.lat == lat && r.lng == lng)
}

/// One arc from a region to a destination point, in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeArc {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub color: Color,
}

/// The arcs currently shown by a globe widget. Replaced wholesale on refresh.
#[derive(Component, Debug, Clone, Default)]
pub struct ArcSet {
    /// Bumped every time the set is replaced; the initial set is generation 0
    pub generation: u64,
    pub arcs: Vec<GlobeArc>,
}

impl ArcSet {
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

/// Sent after a widget's arc set has been replaced
#[derive(Message, Debug, Clone)]
pub struct ArcSetRefreshed {
    pub widget: Entity,
    pub generation: u64,
}
