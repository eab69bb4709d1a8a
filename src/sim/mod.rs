//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed frame step only
//! - Seeded RNG only (per chunk, per battle)
//! - Stable iteration order (arenas keep generation order)
//! - No platform dependencies; drawing goes through `renderer::Surface`

pub mod aabb;
pub mod battle;
pub mod chunk;
pub mod collision;
pub mod combo;
pub mod effects;
pub mod entities;
pub mod player;
pub mod state;
pub mod tick;
pub mod zone;

pub use aabb::Aabb;
pub use battle::{BattleReport, PHONICS_WORDS, choose_word, resolve_battle};
pub use chunk::{ChunkGenerator, ChunkKind};
pub use combo::{Combo, ComboTier};
pub use effects::{EffectKind, StatusEffects};
pub use entities::{
    Checkpoint, Entity, Flyer, Gap, Gate, Grain, GroundHazard, GroundHazardKind, Platform,
    PowerUp, PowerUpKind, Spring,
};
pub use player::{Damage, Player, PlayerStep};
pub use state::{
    CheckpointMark, GameEvent, Outcome, Particle, PendingGate, RunPhase, RunState, RunStats,
    World,
};
pub use tick::{TickInput, tick};
pub use zone::{Palette, Zone, ZoneTracker};
