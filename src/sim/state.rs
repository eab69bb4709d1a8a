//! Run state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::chunk::ChunkGenerator;
use super::combo::Combo;
use super::effects::EffectKind;
use super::entities::{
    Checkpoint, Flyer, Gap, Gate, Grain, GroundHazard, Platform, PowerUp, PowerUpKind, Spring,
};
use super::player::Player;
use super::zone::ZoneTracker;
use crate::consts::*;
use crate::renderer::Color;
use crate::tuning::Tuning;
use crate::{hash_unit, to_meters};

/// Default particle cap (overridden by the quality preset)
pub const MAX_PARTICLES: usize = 256;

/// Data handed to the blend battle when a gate is reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGate {
    /// Practice word for the battle
    pub word: String,
    /// Battle should offer extra help
    pub auto_assist: bool,
    pub distance_m: f32,
}

/// Current phase of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Scrolling, taking input
    Running,
    /// Frozen until the host resolves the battle
    AwaitingBattle(PendingGate),
    /// HP ran out with no checkpoint to fall back on
    Dead,
}

/// Why the runner stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Hand-off to a battle, not a failure
    Gate,
    Dead,
}

/// Fire-and-forget notifications for audio and presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jump,
    DoubleJump,
    Land,
    GroundPoundStart,
    GroundPoundImpact,
    GrainCollected,
    PowerUpCollected(PowerUpKind),
    EffectExpired(EffectKind),
    Stomp,
    ArmorBreak,
    Hit,
    ShieldBlock,
    SpringLaunch,
    CheckpointReached,
    ZoneChanged(usize),
    GateReached,
    ComboLost,
    PitFall,
    Respawn,
    BattleWon,
    BattleLost,
    Death,
}

/// A particle for visual effects
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Where the run resumes when HP runs out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMark {
    /// World distance (pixels) at activation
    pub distance: f32,
    pub spent: bool,
}

/// Per-run tallies for the results screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub grains: u32,
    pub stomps: u32,
    pub power_ups: u32,
    pub hits_taken: u32,
    pub pit_falls: u32,
    pub respawns: u32,
    pub gates_cleared: u32,
    pub battles_failed: u32,
}

/// Per-category object arenas, iterated in generation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub platforms: Vec<Platform>,
    pub grains: Vec<Grain>,
    pub power_ups: Vec<PowerUp>,
    pub ground_hazards: Vec<GroundHazard>,
    pub gaps: Vec<Gap>,
    pub flyers: Vec<Flyer>,
    pub springs: Vec<Spring>,
    pub checkpoints: Vec<Checkpoint>,
    pub gates: Vec<Gate>,
    next_id: u32,
}

impl World {
    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn object_count(&self) -> usize {
        self.platforms.len()
            + self.grains.len()
            + self.power_ups.len()
            + self.ground_hazards.len()
            + self.gaps.len()
            + self.flyers.len()
            + self.springs.len()
            + self.checkpoints.len()
            + self.gates.len()
    }

    /// Remove hazards and bridge gaps in a screen-space span; returns how many were cleared
    pub fn clear_hazards(&mut self, from_x: f32, to_x: f32) -> usize {
        let span = |x: f32, w: f32| x + w > from_x && x < to_x;
        let before = self.ground_hazards.len() + self.flyers.len();
        self.ground_hazards.retain(|h| !span(h.x, h.width));
        self.flyers.retain(|f| !span(f.x, f.width));
        let mut cleared = before - self.ground_hazards.len() - self.flyers.len();
        for gap in self.gaps.iter_mut().filter(|g| !g.bridged && span(g.x, g.width)) {
            gap.bridged = true;
            cleared += 1;
        }
        cleared
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation frame counter
    pub frame: u64,
    /// World distance covered (pixels), never decreases
    pub distance: f32,
    /// Scroll applied last frame (pixels/frame)
    pub speed: f32,
    pub score: u64,
    pub player: Player,
    pub combo: Combo,
    pub zone: ZoneTracker,
    pub generator: ChunkGenerator,
    pub world: World,
    pub phase: RunPhase,
    pub checkpoint: Option<CheckpointMark>,
    /// Failed battles in a row (drives auto-assist)
    pub consecutive_failures: u32,
    /// Battles started so far (seeds word selection)
    pub battles: u32,
    pub last_word: Option<String>,
    pub stats: RunStats,
    /// Logical viewport
    pub width: f32,
    pub height: f32,
    /// Ground surface Y
    pub ground_y: f32,
    #[serde(default = "default_max_particles")]
    pub max_particles: usize,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Undrained notifications
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

fn default_max_particles() -> usize {
    MAX_PARTICLES
}

impl RunState {
    /// Fresh run at distance 0 with full HP; the opening chunks are generated immediately
    pub fn new(seed: u64, width: f32, height: f32, tuning: &Tuning) -> Self {
        let ground_y = height - GROUND_HEIGHT;
        let mut state = Self {
            seed,
            frame: 0,
            distance: 0.0,
            speed: 0.0,
            score: 0,
            player: Player::new(width * PLAYER_SCREEN_X, ground_y, tuning.hp_max),
            combo: Combo::new(),
            zone: ZoneTracker::new(&tuning.zones),
            generator: ChunkGenerator::new(seed),
            world: World::default(),
            phase: RunPhase::Running,
            checkpoint: None,
            consecutive_failures: 0,
            battles: 0,
            last_word: None,
            stats: RunStats::default(),
            width,
            height,
            ground_y,
            max_particles: MAX_PARTICLES,
            particles: Vec::new(),
            events: Vec::new(),
        };
        state.generate_ahead(tuning);
        state
    }

    /// Distance in meters
    pub fn distance_m(&self) -> f32 {
        to_meters(self.distance)
    }

    pub fn done(&self) -> bool {
        self.phase != RunPhase::Running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            RunPhase::Running => None,
            RunPhase::AwaitingBattle(_) => Some(Outcome::Gate),
            RunPhase::Dead => Some(Outcome::Dead),
        }
    }

    pub fn pending_gate(&self) -> Option<&PendingGate> {
        match &self.phase {
            RunPhase::AwaitingBattle(gate) => Some(gate),
            _ => None,
        }
    }

    /// Fill the world until the next chunk starts beyond one chunk plus one screen ahead
    pub fn generate_ahead(&mut self, tuning: &Tuning) -> usize {
        self.generator.ensure_ahead(
            &mut self.world,
            tuning,
            self.distance,
            self.width,
            self.height,
            self.ground_y,
        )
    }

    /// Ground plane under the player, `None` while fully over an open gap
    pub fn ground_under(&self, hitbox: &Aabb) -> Option<f32> {
        if self.world.gaps.iter().any(|g| g.swallows(hitbox)) {
            None
        } else {
            Some(self.ground_y)
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Radial burst of particles; direction jitter is hashed so no RNG is consumed
    pub fn spawn_particles(&mut self, pos: Vec2, color: Color, count: usize, speed: f32) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        let salt = self.frame as u32;
        for i in 0..count.min(room) {
            let angle = hash_unit(salt, i as u32 * 2) * std::f32::consts::TAU;
            let mag = speed * (0.5 + 0.5 * hash_unit(salt, i as u32 * 2 + 1));
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * mag,
                color,
                life: 1.0,
                size: 3.0 + 2.0 * hash_unit(salt ^ 0xA5, i as u32),
            });
        }
    }

    /// Age and move particles (they drift with the scroll)
    pub fn update_particles(&mut self, scroll: f32) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.pos.x -= scroll;
            p.vel.y += GRAVITY * 0.3;
            p.life -= 0.03;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Serialize for Continue
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn restore(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
