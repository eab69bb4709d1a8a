//! Phonics Runner - endless-runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic frame-stepped simulation (physics, generation, collisions)
//! - `runner`: Host-facing engine (frame clock, battle hand-off, collaborators)
//! - `renderer`: Drawing surface and GPU-ready vertex output
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality, motion, volume)
//! - `audio`: Fire-and-forget sound sink
//! - `progress`: Cosmetics and battle-outcome collaborator

pub mod audio;
pub mod progress;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use runner::EndlessRunner;
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
///
/// Everything is expressed per frame at 60 Hz in logical pixels, y pointing down.
pub mod consts {
    /// Fixed simulation timestep (one logical frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// World pixels per displayed meter
    pub const PIXELS_PER_METER: f32 = 10.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 36.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    /// Hit box is inset from the sprite box to keep contact forgiving
    pub const HITBOX_INSET: f32 = 6.0;
    /// Player stays at this fraction of the screen width
    pub const PLAYER_SCREEN_X: f32 = 0.2;
    pub const HP_MAX: u8 = 3;

    /// Ground strip height measured from the bottom of the screen
    pub const GROUND_HEIGHT: f32 = 64.0;

    /// Vertical physics (pixels/frame, pixels/frame²)
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_VELOCITY: f32 = -11.5;
    pub const DOUBLE_JUMP_VELOCITY: f32 = -10.0;
    pub const TERMINAL_VELOCITY: f32 = 14.0;
    pub const POUND_VELOCITY: f32 = 16.0;
    pub const POUND_TERMINAL_VELOCITY: f32 = 22.0;
    /// Early release multiplies upward velocity by this
    pub const JUMP_CUT_FACTOR: f32 = 0.45;
    pub const MAX_HOLD_FRAMES: u32 = 12;

    /// Jump assists
    pub const COYOTE_FRAMES: u32 = 6;
    pub const JUMP_BUFFER_FRAMES: u32 = 8;

    /// Presentation counters that double as event markers
    pub const LANDING_SQUASH_FRAMES: u32 = 8;
    pub const ZONE_FLASH_FRAMES: u32 = 30;

    /// Hazard interaction
    pub const INVINCIBLE_FRAMES: u32 = 90;
    pub const STOMP_BOUNCE: f32 = -9.0;
    pub const ARMOR_BOUNCE: f32 = -6.0;
    /// An enemy that just lost armor can't touch the player for this long
    pub const ARMOR_STAGGER_FRAMES: u32 = 16;
    pub const POUND_RADIUS: f32 = 140.0;

    /// Springs
    pub const SPRING_VELOCITY: f32 = -17.0;
    pub const SPRING_COOLDOWN_FRAMES: u32 = 20;

    /// Magnet power-up reach and pull (pixels, pixels/frame)
    pub const MAGNET_RADIUS: f32 = 170.0;
    pub const MAGNET_PULL: f32 = 9.0;

    /// Entities further left than this are culled
    pub const CULL_MARGIN: f32 = 120.0;
    /// Falling this far below the screen is a pit fall
    pub const PIT_MARGIN: f32 = 40.0;
}

/// Convert a world distance in pixels to meters
#[inline]
pub fn to_meters(pixels: f32) -> f32 {
    pixels / consts::PIXELS_PER_METER
}

/// Cheap deterministic hash for cosmetic randomness (particles, bob phases)
#[inline]
pub fn hash_u32(a: u32, b: u32) -> u32 {
    a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(7919))
}

/// Hash to a unit float in [0, 1)
#[inline]
pub fn hash_unit(a: u32, b: u32) -> f32 {
    (hash_u32(a, b) % 1000) as f32 / 1000.0
}
