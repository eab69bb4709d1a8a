//! Distance-driven zones
//!
//! The zone table maps a minimum distance to a named look and a couple of
//! mechanical modifiers. The tracker reports a change exactly once per
//! boundary crossing.

use serde::{Deserialize, Serialize};

use crate::consts::ZONE_FLASH_FRAMES;
use crate::renderer::Color;

/// Colors for one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub sky: Color,
    pub ground: Color,
    pub platform: Color,
}

/// One row of the zone table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    /// Zone starts once this many meters have been covered
    pub min_distance_m: f32,
    pub palette: Palette,
    /// Multiplies scroll speed
    #[serde(default = "one")]
    pub speed_mult: f32,
    /// Multiplies gap/spike/flyer chunk weights
    #[serde(default = "one")]
    pub hazard_bias: f32,
}

fn one() -> f32 {
    1.0
}

impl Zone {
    pub fn new(name: &str, min_distance_m: f32, palette: Palette) -> Self {
        Self {
            name: name.to_string(),
            min_distance_m,
            palette,
            speed_mult: 1.0,
            hazard_bias: 1.0,
        }
    }

    pub fn with_modifiers(mut self, speed_mult: f32, hazard_bias: f32) -> Self {
        self.speed_mult = speed_mult;
        self.hazard_bias = hazard_bias;
        self
    }
}

/// Shipped zone table, ordered by threshold
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::new(
            "Meadow",
            0.0,
            Palette {
                sky: [0.55, 0.8, 0.95, 1.0],
                ground: [0.35, 0.65, 0.3, 1.0],
                platform: [0.55, 0.4, 0.25, 1.0],
            },
        ),
        Zone::new(
            "Desert",
            300.0,
            Palette {
                sky: [0.95, 0.85, 0.6, 1.0],
                ground: [0.85, 0.7, 0.4, 1.0],
                platform: [0.7, 0.5, 0.3, 1.0],
            },
        )
        .with_modifiers(1.05, 1.1),
        Zone::new(
            "Canyon",
            700.0,
            Palette {
                sky: [0.9, 0.55, 0.4, 1.0],
                ground: [0.6, 0.3, 0.2, 1.0],
                platform: [0.45, 0.25, 0.2, 1.0],
            },
        )
        .with_modifiers(1.1, 1.2),
        Zone::new(
            "Volcano",
            1200.0,
            Palette {
                sky: [0.3, 0.1, 0.1, 1.0],
                ground: [0.25, 0.2, 0.2, 1.0],
                platform: [0.5, 0.2, 0.1, 1.0],
            },
        )
        .with_modifiers(1.15, 1.3),
        Zone::new(
            "Sky Castle",
            2000.0,
            Palette {
                sky: [0.2, 0.2, 0.45, 1.0],
                ground: [0.7, 0.7, 0.8, 1.0],
                platform: [0.85, 0.85, 0.95, 1.0],
            },
        )
        .with_modifiers(1.2, 1.4),
    ]
}

/// Index of the highest-threshold zone reached at `distance_m`
pub fn zone_index_for(zones: &[Zone], distance_m: f32) -> usize {
    zones
        .iter()
        .enumerate()
        .filter(|(_, z)| distance_m >= z.min_distance_m)
        .max_by(|(_, a), (_, b)| a.min_distance_m.total_cmp(&b.min_distance_m))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Tracks the active zone and the transition flash
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneTracker {
    pub current: usize,
    /// Transition flash countdown (presentation)
    pub flash: u32,
}

impl ZoneTracker {
    /// Start in whichever zone covers 0 m
    pub fn new(zones: &[Zone]) -> Self {
        Self {
            current: zone_index_for(zones, 0.0),
            flash: 0,
        }
    }

    /// Recompute the zone; returns the new index only on the frame it changes
    pub fn update(&mut self, zones: &[Zone], distance_m: f32) -> Option<usize> {
        self.flash = self.flash.saturating_sub(1);
        let index = zone_index_for(zones, distance_m);
        if index == self.current {
            return None;
        }
        self.current = index;
        self.flash = ZONE_FLASH_FRAMES;
        Some(index)
    }
}
