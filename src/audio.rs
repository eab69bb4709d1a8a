//! Sound notifications
//!
//! The simulation never plays audio itself. Drained `GameEvent`s map to
//! `SoundEffect`s, which the manager forwards to a host-provided sink with the
//! effective volume applied. Playback is fire-and-forget.

use crate::sim::state::GameEvent;
use crate::sim::entities::PowerUpKind;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    DoubleJump,
    Land,
    /// Ground pound slam
    Pound,
    /// Grain picked up
    Grain,
    PowerUp,
    /// Heart picked up
    Heal,
    /// Power-up wore off
    PowerDown,
    Stomp,
    /// Armor cracked but enemy still standing
    Clank,
    Hurt,
    ShieldBlock,
    Spring,
    Checkpoint,
    ZoneChange,
    /// Gate reached, battle about to start
    Gate,
    ComboLost,
    Fall,
    Victory,
    Defeat,
    GameOver,
}

impl SoundEffect {
    /// Relative loudness so frequent sounds sit under rare ones
    pub fn base_gain(self) -> f32 {
        match self {
            SoundEffect::Grain | SoundEffect::Land => 0.4,
            SoundEffect::Jump | SoundEffect::DoubleJump => 0.6,
            SoundEffect::Gate | SoundEffect::GameOver | SoundEffect::Victory => 1.0,
            _ => 0.8,
        }
    }
}

/// Host audio backend
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards everything (headless runs)
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Records what would have played
impl AudioSink for Vec<(SoundEffect, f32)> {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.push((effect, volume));
    }
}

/// Which sound, if any, an event makes
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::Jump => SoundEffect::Jump,
        GameEvent::DoubleJump => SoundEffect::DoubleJump,
        GameEvent::Land => SoundEffect::Land,
        GameEvent::GroundPoundStart => return None,
        GameEvent::GroundPoundImpact => SoundEffect::Pound,
        GameEvent::GrainCollected => SoundEffect::Grain,
        GameEvent::PowerUpCollected(PowerUpKind::Heart) => SoundEffect::Heal,
        GameEvent::PowerUpCollected(_) => SoundEffect::PowerUp,
        GameEvent::EffectExpired(_) => SoundEffect::PowerDown,
        GameEvent::Stomp => SoundEffect::Stomp,
        GameEvent::ArmorBreak => SoundEffect::Clank,
        GameEvent::Hit => SoundEffect::Hurt,
        GameEvent::ShieldBlock => SoundEffect::ShieldBlock,
        GameEvent::SpringLaunch => SoundEffect::Spring,
        GameEvent::CheckpointReached => SoundEffect::Checkpoint,
        GameEvent::ZoneChanged(_) => SoundEffect::ZoneChange,
        GameEvent::GateReached => SoundEffect::Gate,
        GameEvent::ComboLost => SoundEffect::ComboLost,
        GameEvent::PitFall => SoundEffect::Fall,
        GameEvent::Respawn => SoundEffect::Checkpoint,
        GameEvent::BattleWon => SoundEffect::Victory,
        GameEvent::BattleLost => SoundEffect::Defeat,
        GameEvent::Death => SoundEffect::GameOver,
    };
    Some(effect)
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_gain();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play whatever a batch of simulation events calls for
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(sound_for) {
            self.play(effect);
        }
    }
}
