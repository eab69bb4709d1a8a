//! Data-driven game balance
//!
//! The difficulty curve (speed ramp, chunk weights, gate cadence) and reward
//! values are policy, not code: they load from JSON and fall back to the
//! shipped defaults field by field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::combo::{ComboTier, default_tiers};
use crate::sim::entities::PowerUpKind;
use crate::sim::zone::{Zone, default_zones};

/// Gates closer together than this would make the runner all battles
pub const MIN_GATE_FLOOR: u32 = 3;

/// Problems with a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gate interval floor {0} is below the minimum of {MIN_GATE_FLOOR}")]
    GateFloorTooLow(u32),
    #[error("gate interval start {start} is below its floor {floor}")]
    GateIntervalBelowFloor { start: u32, floor: u32 },
    #[error("zone table is empty")]
    EmptyZones,
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
}

/// Relative chunk-type weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkWeights {
    pub safe: f32,
    pub platform: f32,
    pub gap: f32,
    pub spike: f32,
    pub flyer: f32,
}

impl ChunkWeights {
    /// Linear blend toward `other` by `t` in [0, 1]
    pub fn lerp(&self, other: &ChunkWeights, t: f32) -> ChunkWeights {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        ChunkWeights {
            safe: mix(self.safe, other.safe),
            platform: mix(self.platform, other.platform),
            gap: mix(self.gap, other.gap),
            spike: mix(self.spike, other.spike),
            flyer: mix(self.flyer, other.flyer),
        }
    }
}

/// Game balance knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed (pixels/frame) ===
    pub base_speed: f32,
    /// Added per meter covered
    pub speed_ramp_per_m: f32,
    pub max_speed: f32,
    /// Scroll multiplier while slow-mo is active
    pub slow_mo_factor: f32,

    // === Generation ===
    pub chunk_width: f32,
    /// Opening chunks that never contain hazards
    pub grace_chunks: u32,
    pub gate_interval_start: u32,
    pub gate_interval_floor: u32,
    /// Gate interval shrinks by one chunk every this many meters
    pub gate_shrink_every_m: f32,
    /// Distance at which difficulty saturates at 1.0
    pub difficulty_full_at_m: f32,
    pub weights_start: ChunkWeights,
    pub weights_end: ChunkWeights,
    /// Non-hazard chunks required between gap/spike chunks
    pub hazard_spacing: u32,
    pub power_up_chance: f32,
    pub grains_min: u32,
    pub grains_max: u32,
    pub spring_chance: f32,
    /// Chance of an oscillating platform at full difficulty
    pub oscillate_chance_max: f32,
    /// Checkpoint flag every this many chunks (0 disables)
    pub checkpoint_every: u32,
    /// Difficulty at which armored enemies start appearing
    pub armor_from_difficulty: f32,
    pub armor_chance: f32,

    // === Power-up durations (frames) ===
    pub shield_frames: u32,
    pub double_jump_frames: u32,
    pub magnet_frames: u32,
    pub slow_mo_frames: u32,
    pub star_frames: u32,

    // === Scoring ===
    pub grain_reward: u64,
    pub stomp_reward: u64,
    pub gate_reward: u64,
    pub checkpoint_reward: u64,
    pub power_up_reward: u64,
    /// Frames a combo survives without a new success
    pub combo_window: u32,
    pub combo_tiers: Vec<ComboTier>,

    // === Battle hand-off ===
    pub battle_invincibility_frames: u32,
    /// Consecutive failed battles before auto-assist kicks in
    pub assist_after_failures: u32,

    // === Survival ===
    pub hp_max: u8,
    /// Hazards this far ahead of the player are cleared on checkpoint respawn
    pub respawn_clear_px: f32,

    pub zones: Vec<Zone>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            speed_ramp_per_m: 0.003,
            max_speed: 12.0,
            slow_mo_factor: 0.6,

            chunk_width: 480.0,
            grace_chunks: 3,
            gate_interval_start: 8,
            gate_interval_floor: 3,
            gate_shrink_every_m: 150.0,
            difficulty_full_at_m: 1500.0,
            weights_start: ChunkWeights {
                safe: 4.0,
                platform: 3.0,
                gap: 1.0,
                spike: 1.5,
                flyer: 0.5,
            },
            weights_end: ChunkWeights {
                safe: 1.0,
                platform: 2.5,
                gap: 2.5,
                spike: 3.0,
                flyer: 2.5,
            },
            hazard_spacing: 1,
            power_up_chance: 0.12,
            grains_min: 5,
            grains_max: 8,
            spring_chance: 0.3,
            oscillate_chance_max: 0.6,
            checkpoint_every: 10,
            armor_from_difficulty: 0.4,
            armor_chance: 0.35,

            shield_frames: 1200,
            double_jump_frames: 600,
            magnet_frames: 480,
            slow_mo_frames: 300,
            star_frames: 360,

            grain_reward: 10,
            stomp_reward: 50,
            gate_reward: 200,
            checkpoint_reward: 100,
            power_up_reward: 25,
            combo_window: 180,
            combo_tiers: default_tiers(),

            battle_invincibility_frames: 120,
            assist_after_failures: 2,

            hp_max: crate::consts::HP_MAX,
            respawn_clear_px: 360.0,

            zones: default_zones(),
        }
    }
}

impl Tuning {
    /// Parse and validate a (possibly partial) tuning file
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.gate_interval_floor < MIN_GATE_FLOOR {
            return Err(TuningError::GateFloorTooLow(self.gate_interval_floor));
        }
        if self.gate_interval_start < self.gate_interval_floor {
            return Err(TuningError::GateIntervalBelowFloor {
                start: self.gate_interval_start,
                floor: self.gate_interval_floor,
            });
        }
        if self.zones.is_empty() {
            return Err(TuningError::EmptyZones);
        }
        let positives = [
            ("chunk_width", self.chunk_width),
            ("base_speed", self.base_speed),
            ("max_speed", self.max_speed),
            ("gate_shrink_every_m", self.gate_shrink_every_m),
            ("difficulty_full_at_m", self.difficulty_full_at_m),
            ("slow_mo_factor", self.slow_mo_factor),
        ];
        for (name, value) in positives {
            if value <= 0.0 {
                return Err(TuningError::NonPositive(name));
            }
        }
        if self.hp_max == 0 {
            return Err(TuningError::NonPositive("hp_max"));
        }
        let probabilities = [
            ("power_up_chance", self.power_up_chance),
            ("spring_chance", self.spring_chance),
            ("oscillate_chance_max", self.oscillate_chance_max),
            ("armor_chance", self.armor_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::Probability { name, value });
            }
        }
        Ok(())
    }

    /// Normalized difficulty in [0, 1]
    pub fn difficulty(&self, distance_m: f32) -> f32 {
        (distance_m / self.difficulty_full_at_m).clamp(0.0, 1.0)
    }

    /// Chunks allowed between gates at this distance
    pub fn gate_interval(&self, distance_m: f32) -> u32 {
        let steps = (distance_m.max(0.0) / self.gate_shrink_every_m) as u32;
        self.gate_interval_start
            .saturating_sub(steps)
            .max(self.gate_interval_floor)
    }

    /// Base scroll speed before zone and slow-mo modifiers
    pub fn speed_for(&self, distance_m: f32) -> f32 {
        (self.base_speed + self.speed_ramp_per_m * distance_m.max(0.0)).min(self.max_speed)
    }

    pub fn weights_at(&self, difficulty: f32) -> ChunkWeights {
        self.weights_start
            .lerp(&self.weights_end, difficulty.clamp(0.0, 1.0))
    }

    /// Effect duration for a power-up (Heart is instant)
    pub fn power_up_frames(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Shield => self.shield_frames,
            PowerUpKind::DoubleJump => self.double_jump_frames,
            PowerUpKind::Magnet => self.magnet_frames,
            PowerUpKind::SlowMo => self.slow_mo_frames,
            PowerUpKind::Star => self.star_frames,
            PowerUpKind::Heart => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 7.5, "gate_interval_start": 10 }"#)
            .expect("partial tuning should parse");
        assert_eq!(tuning.base_speed, 7.5);
        assert_eq!(tuning.gate_interval_start, 10);
        assert_eq!(tuning.chunk_width, Tuning::default().chunk_width);
        assert_eq!(tuning.zones.len(), default_zones().len());
    }

    #[test]
    fn test_rejects_low_gate_floor() {
        let err = Tuning::from_json(r#"{ "gate_interval_floor": 1 }"#).unwrap_err();
        assert!(matches!(err, TuningError::GateFloorTooLow(1)));
    }

    #[test]
    fn test_rejects_bad_json_and_probabilities() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "power_up_chance": 1.5 }"#),
            Err(TuningError::Probability { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "zones": [] }"#),
            Err(TuningError::EmptyZones)
        ));
    }

    #[test]
    fn test_gate_interval_shrinks_to_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.gate_interval(0.0), 8);
        assert_eq!(tuning.gate_interval(150.0), 7);
        assert_eq!(tuning.gate_interval(100_000.0), tuning.gate_interval_floor);
        let mut last = u32::MAX;
        for m in (0..5000).step_by(10) {
            let interval = tuning.gate_interval(m as f32);
            assert!(interval <= last);
            assert!(interval >= tuning.gate_interval_floor);
            last = interval;
        }
    }

    #[test]
    fn test_speed_ramp_capped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed_for(0.0), tuning.base_speed);
        assert!(tuning.speed_for(500.0) > tuning.base_speed);
        assert_eq!(tuning.speed_for(1.0e6), tuning.max_speed);
    }

    #[test]
    fn test_round_trip_json() {
        let json = Tuning::default().to_json().expect("serialize");
        let back = Tuning::from_json(&json).expect("parse");
        assert_eq!(back.combo_tiers, default_tiers());
    }
}
