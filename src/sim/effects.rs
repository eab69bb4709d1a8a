//! Timed status effects
//!
//! Every frame countdown on the player (power-ups, invincibility) lives in one
//! map and is advanced by a single decrement-and-expire pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Effect kinds with a frame countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Post-hit grace window, no damage taken
    Invincible,
    /// Absorbs exactly one hit
    Shield,
    /// One extra jump per airborne period
    DoubleJump,
    /// Pulls grains toward the player
    Magnet,
    /// Slows the scroll speed
    SlowMo,
    /// Total immunity, touching hazards defeats them
    Star,
}

/// Active effects keyed by kind (ordered for deterministic iteration)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    remaining: BTreeMap<EffectKind, u32>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or extend an effect. A shorter grant never cuts a longer timer.
    pub fn grant(&mut self, kind: EffectKind, frames: u32) {
        if frames == 0 {
            return;
        }
        let slot = self.remaining.entry(kind).or_insert(0);
        *slot = (*slot).max(frames);
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.remaining.get(&kind).is_some_and(|&f| f > 0)
    }

    pub fn remaining(&self, kind: EffectKind) -> u32 {
        self.remaining.get(&kind).copied().unwrap_or(0)
    }

    /// Remove an effect early. Returns whether it was active.
    pub fn consume(&mut self, kind: EffectKind) -> bool {
        self.remaining.remove(&kind).is_some_and(|f| f > 0)
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    /// Advance one frame; returns the effects that ran out on this frame
    pub fn tick(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for (kind, frames) in self.remaining.iter_mut() {
            *frames = frames.saturating_sub(1);
            if *frames == 0 {
                expired.push(*kind);
            }
        }
        self.remaining.retain(|_, f| *f > 0);
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, u32)> + '_ {
        self.remaining.iter().map(|(k, f)| (*k, *f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_keeps_longer_timer() {
        let mut fx = StatusEffects::new();
        fx.grant(EffectKind::Magnet, 100);
        fx.grant(EffectKind::Magnet, 10);
        assert_eq!(fx.remaining(EffectKind::Magnet), 100);
        fx.grant(EffectKind::Magnet, 300);
        assert_eq!(fx.remaining(EffectKind::Magnet), 300);
    }

    #[test]
    fn test_tick_expires_once() {
        let mut fx = StatusEffects::new();
        fx.grant(EffectKind::SlowMo, 2);
        assert!(fx.tick().is_empty());
        assert_eq!(fx.tick(), vec![EffectKind::SlowMo]);
        // Already gone, must not report again
        assert!(fx.tick().is_empty());
        assert!(!fx.is_active(EffectKind::SlowMo));
    }

    #[test]
    fn test_consume() {
        let mut fx = StatusEffects::new();
        fx.grant(EffectKind::Shield, 600);
        assert!(fx.consume(EffectKind::Shield));
        assert!(!fx.consume(EffectKind::Shield));
        assert!(!fx.is_active(EffectKind::Shield));
    }

    #[test]
    fn test_zero_grant_is_noop() {
        let mut fx = StatusEffects::new();
        fx.grant(EffectKind::Star, 0);
        assert!(!fx.is_active(EffectKind::Star));
        assert_eq!(fx.iter().count(), 0);
    }
}
