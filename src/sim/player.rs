//! Runner player physics
//!
//! Input methods only record intent; `Player::update` is the single place where
//! position and velocity change. Each update reports the edge-detected
//! transitions (jumped, landed, left ground, pound impact) for that frame so
//! other systems never re-derive them.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::effects::{EffectKind, StatusEffects};
use super::entities::{Entity, Platform};
use crate::consts::*;

/// Slack when testing "was above the surface last frame"
const LAND_EPSILON: f32 = 1.0;

/// Outcome of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Invincibility window or star power, nothing happened
    Ignored,
    /// Shield soaked the hit and was consumed
    Absorbed,
    /// One HP lost
    Taken,
}

impl Damage {
    /// Whether HP was actually lost (breaks combos, spawns hurt particles)
    pub fn applied(self) -> bool {
        self == Damage::Taken
    }
}

/// Transitions that happened during one `update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStep {
    /// A ground, coyote or buffered jump launched this frame
    pub jumped: bool,
    /// The jump came out of the input buffer on the landing frame
    pub buffered_jump: bool,
    pub double_jumped: bool,
    /// Airborne last frame, grounded this frame
    pub landed: bool,
    /// Walked off a ledge (not a jump)
    pub left_ground: bool,
    pub pound_started: bool,
    /// Ground pound met the ground; fires exactly once per pound
    pub pound_impact: bool,
    /// Status effects that ran out this frame
    pub expired: Vec<EffectKind>,
}

/// Pending input intents, applied at the start of the next update
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct Intent {
    jump: bool,
    release: bool,
    pound: bool,
    bounce: Option<f32>,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Left edge (fixed on screen)
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub on_ground: bool,
    pub hp: u8,
    pub hp_max: u8,
    pub effects: StatusEffects,
    /// Frames left in which a ledge jump is still allowed
    pub coyote_frames: u32,
    /// Frames left in which a queued jump fires on landing
    pub jump_buffer: u32,
    /// Frames the current jump has been held
    pub hold_frames: u32,
    pub holding: bool,
    pub double_jump_used: bool,
    pub pounding: bool,
    /// Landing squash countdown (presentation)
    pub squash: u32,
    /// Platform currently stood on
    pub support: Option<u32>,
    intent: Intent,
}

impl Player {
    pub fn new(x: f32, ground_y: f32, hp_max: u8) -> Self {
        Self {
            x,
            y: ground_y - PLAYER_HEIGHT,
            vy: 0.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            on_ground: true,
            hp: hp_max,
            hp_max,
            effects: StatusEffects::new(),
            coyote_frames: 0,
            jump_buffer: 0,
            hold_frames: 0,
            holding: false,
            double_jump_used: false,
            pounding: false,
            squash: 0,
            support: None,
            intent: Intent::default(),
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Full sprite box
    pub fn sprite_box(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Forgiving collision box
    pub fn hitbox(&self) -> Aabb {
        self.sprite_box().inset(HITBOX_INSET)
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    // === Intents ===

    /// Jump pressed
    pub fn jump(&mut self) {
        self.intent.jump = true;
    }

    /// Jump released (cuts a rising jump short)
    pub fn release_jump(&mut self) {
        self.intent.release = true;
    }

    /// Slam down; only honored while airborne
    pub fn ground_pound(&mut self) {
        self.intent.pound = true;
    }

    /// Upward kick from a stomp or spring, applied on the next update
    pub fn bounce(&mut self, vy: f32) {
        self.intent.bounce = Some(match self.intent.bounce {
            Some(existing) => existing.min(vy),
            None => vy,
        });
    }

    fn can_ground_jump(&self) -> bool {
        self.on_ground || self.coyote_frames > 0
    }

    fn can_double_jump(&self) -> bool {
        !self.on_ground && !self.double_jump_used && self.effects.is_active(EffectKind::DoubleJump)
    }

    fn launch(&mut self, vy: f32) {
        self.vy = vy;
        self.on_ground = false;
        self.support = None;
        self.coyote_frames = 0;
        self.jump_buffer = 0;
        self.holding = true;
        self.hold_frames = 0;
    }

    /// Advance one frame against the ground plane (`None` over a gap) and platforms
    pub fn update(&mut self, ground: Option<f32>, platforms: &[Platform]) -> PlayerStep {
        let mut step = PlayerStep::default();
        let was_on_ground = self.on_ground;
        let intent = std::mem::take(&mut self.intent);
        let mut buffer_set = false;
        let mut coyote_set = false;

        self.squash = self.squash.saturating_sub(1);

        if let Some(vy) = intent.bounce {
            self.vy = vy;
            self.on_ground = false;
            self.support = None;
            self.coyote_frames = 0;
            self.pounding = false;
            self.holding = false;
        }

        if intent.jump {
            if self.can_ground_jump() {
                self.launch(JUMP_VELOCITY);
                step.jumped = true;
            } else if self.can_double_jump() {
                self.launch(DOUBLE_JUMP_VELOCITY);
                self.double_jump_used = true;
                self.pounding = false;
                step.double_jumped = true;
            } else {
                self.jump_buffer = JUMP_BUFFER_FRAMES;
                buffer_set = true;
            }
        }

        if intent.release {
            if self.holding && self.vy < 0.0 && self.hold_frames < MAX_HOLD_FRAMES {
                self.vy *= JUMP_CUT_FACTOR;
            }
            self.holding = false;
        }

        if intent.pound && !self.on_ground && !self.pounding {
            self.pounding = true;
            self.holding = false;
            self.vy = POUND_VELOCITY;
            step.pound_started = true;
        }

        if self.holding {
            if self.vy < 0.0 && self.hold_frames < MAX_HOLD_FRAMES {
                self.hold_frames += 1;
            } else if self.vy >= 0.0 {
                self.holding = false;
            }
        }

        // Integrate
        let terminal = if self.pounding {
            POUND_TERMINAL_VELOCITY
        } else {
            TERMINAL_VELOCITY
        };
        self.vy = (self.vy + GRAVITY).min(terminal);
        let prev_bottom = self.bottom();
        self.y += self.vy;

        // Resolve landing: highest crossed surface wins
        self.on_ground = false;
        let feet = self.hitbox();
        let mut landing: Option<(f32, Option<u32>)> = None;
        if self.vy >= 0.0 {
            for platform in platforms {
                let surface = platform.bounds();
                if !feet.overlaps_x(&surface) {
                    continue;
                }
                let standing = self.support == Some(platform.id);
                let crossed = prev_bottom <= platform.prev_top() + LAND_EPSILON
                    && self.bottom() >= platform.top();
                if (standing || crossed)
                    && landing.is_none_or(|(top, _)| platform.top() < top)
                {
                    landing = Some((platform.top(), Some(platform.id)));
                }
            }
            if landing.is_none() {
                if let Some(gy) = ground {
                    if prev_bottom <= gy + LAND_EPSILON && self.bottom() >= gy {
                        landing = Some((gy, None));
                    }
                }
            }
        }

        match landing {
            Some((top, support)) => {
                self.y = top - self.height;
                self.vy = 0.0;
                self.on_ground = true;
                self.support = support;
            }
            None => self.support = None,
        }

        if self.on_ground && !was_on_ground {
            step.landed = true;
            self.squash = LANDING_SQUASH_FRAMES;
            self.double_jump_used = false;
            self.holding = false;
            if self.pounding {
                self.pounding = false;
                step.pound_impact = true;
            }
            if self.jump_buffer > 0 {
                self.launch(JUMP_VELOCITY);
                step.jumped = true;
                step.buffered_jump = true;
            }
        }

        if was_on_ground && !self.on_ground && !step.jumped && intent.bounce.is_none() {
            self.coyote_frames = COYOTE_FRAMES;
            coyote_set = true;
            step.left_ground = true;
        }

        if !coyote_set {
            self.coyote_frames = self.coyote_frames.saturating_sub(1);
        }
        if !buffer_set {
            self.jump_buffer = self.jump_buffer.saturating_sub(1);
        }

        step.expired = self.effects.tick();
        step
    }

    /// Apply a hazard hit following the absorb order:
    /// invincibility, then star, then shield, then HP.
    pub fn damage(&mut self) -> Damage {
        if self.effects.is_active(EffectKind::Invincible) || self.effects.is_active(EffectKind::Star) {
            return Damage::Ignored;
        }
        if self.effects.consume(EffectKind::Shield) {
            self.effects.grant(EffectKind::Invincible, INVINCIBLE_FRAMES);
            return Damage::Absorbed;
        }
        self.hp = self.hp.saturating_sub(1);
        self.effects.grant(EffectKind::Invincible, INVINCIBLE_FRAMES);
        Damage::Taken
    }

    /// Restore one HP, never above the maximum
    pub fn heal(&mut self) {
        self.hp = self.hp.saturating_add(1).min(self.hp_max);
    }

    /// Put the runner back on the ground after a pit fall or checkpoint respawn
    pub fn respawn(&mut self, ground_y: f32, invincible_frames: u32) {
        self.y = ground_y - self.height;
        self.vy = 0.0;
        self.on_ground = true;
        self.support = None;
        self.coyote_frames = 0;
        self.jump_buffer = 0;
        self.holding = false;
        self.pounding = false;
        self.double_jump_used = false;
        self.intent = Intent::default();
        self.effects.grant(EffectKind::Invincible, invincible_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f32 = 500.0;

    fn grounded() -> Player {
        Player::new(100.0, GROUND, HP_MAX)
    }

    /// Run a jump from the ground, releasing after `release_after` frames
    fn peak_height(release_after: Option<u32>) -> f32 {
        let mut p = grounded();
        p.jump();
        let start = p.y;
        let mut min_y = p.y;
        for frame in 0..120 {
            if Some(frame) == release_after {
                p.release_jump();
            }
            p.update(Some(GROUND), &[]);
            min_y = min_y.min(p.y);
        }
        start - min_y
    }

    #[test]
    fn test_standing_is_stable() {
        let mut p = grounded();
        let y = p.y;
        for _ in 0..10 {
            let step = p.update(Some(GROUND), &[]);
            assert!(!step.landed);
            assert!(!step.left_ground);
        }
        assert!(p.on_ground);
        assert_eq!(p.y, y);
    }

    #[test]
    fn test_jump_and_land() {
        let mut p = grounded();
        p.jump();
        let step = p.update(Some(GROUND), &[]);
        assert!(step.jumped);
        assert!(!p.on_ground);

        let mut landed_frames = 0;
        for _ in 0..100 {
            if p.update(Some(GROUND), &[]).landed {
                landed_frames += 1;
            }
        }
        assert_eq!(landed_frames, 1);
        assert!(p.on_ground);
        assert_eq!(p.bottom(), GROUND);
    }

    #[test]
    fn test_variable_height_monotonic() {
        let tap = peak_height(Some(2));
        let mid = peak_height(Some(6));
        let full = peak_height(None);
        let capped = peak_height(Some(MAX_HOLD_FRAMES + 2));
        assert!(tap < mid, "tap {tap} should be lower than mid {mid}");
        assert!(mid < full, "mid {mid} should be lower than full {full}");
        assert!((capped - full).abs() < 1e-3);
    }

    #[test]
    fn test_coyote_jump_matches_grounded_arc() {
        // Grounded reference arc
        let mut reference = grounded();
        reference.jump();
        let ref_start = reference.y;
        let mut ref_arc = Vec::new();
        for _ in 0..10 {
            reference.update(Some(GROUND), &[]);
            ref_arc.push(reference.y - ref_start);
        }

        // Walk off a ledge (ground disappears), jump a few frames later
        let mut p = grounded();
        let step = p.update(None, &[]);
        assert!(step.left_ground);
        for _ in 0..(COYOTE_FRAMES - 1) {
            p.update(None, &[]);
        }
        assert!(p.coyote_frames > 0);
        p.jump();
        let start = p.y;
        let mut arc = Vec::new();
        for i in 0..10 {
            let step = p.update(None, &[]);
            if i == 0 {
                assert!(step.jumped);
            }
            arc.push(p.y - start);
        }
        for (a, b) in arc.iter().zip(&ref_arc) {
            assert!((a - b).abs() < 1e-2);
        }
    }

    #[test]
    fn test_coyote_window_expires() {
        let mut p = grounded();
        p.update(None, &[]);
        for _ in 0..COYOTE_FRAMES {
            p.update(None, &[]);
        }
        p.jump();
        let step = p.update(None, &[]);
        assert!(!step.jumped);
        assert_eq!(p.jump_buffer, JUMP_BUFFER_FRAMES);
    }

    #[test]
    fn test_buffered_jump_fires_on_landing() {
        let mut p = grounded();
        p.jump();
        p.update(Some(GROUND), &[]);
        // Fall until just before touchdown
        while p.vy < 0.0 || p.bottom() + p.vy + GRAVITY < GROUND {
            p.update(Some(GROUND), &[]);
        }
        p.jump();
        let step = p.update(Some(GROUND), &[]);
        assert!(step.landed);
        assert!(step.jumped);
        assert!(step.buffered_jump);
        assert_eq!(p.vy, JUMP_VELOCITY);
        assert_eq!(p.jump_buffer, 0);
    }

    #[test]
    fn test_buffer_expires_before_landing() {
        let mut p = grounded();
        p.jump();
        p.update(Some(GROUND), &[]);
        // Ask for a jump at the apex, far from the ground
        while p.vy < 0.0 {
            p.update(Some(GROUND), &[]);
        }
        p.jump();
        let mut fired = false;
        for _ in 0..120 {
            if p.update(Some(GROUND), &[]).buffered_jump {
                fired = true;
            }
        }
        assert!(!fired);
        assert!(p.on_ground);
    }

    #[test]
    fn test_double_jump_once_per_flight() {
        let mut p = grounded();
        p.effects.grant(EffectKind::DoubleJump, 600);
        p.jump();
        p.update(Some(GROUND), &[]);
        for _ in 0..5 {
            p.update(Some(GROUND), &[]);
        }
        p.jump();
        assert!(p.update(Some(GROUND), &[]).double_jumped);
        p.jump();
        let step = p.update(Some(GROUND), &[]);
        assert!(!step.double_jumped);
        assert!(!step.jumped);

        // Landing resets the flag
        for _ in 0..120 {
            p.update(Some(GROUND), &[]);
        }
        assert!(p.on_ground);
        assert!(!p.double_jump_used);
    }

    #[test]
    fn test_ground_pound_impact_once() {
        let mut p = grounded();
        // Pound is ignored on the ground
        p.ground_pound();
        assert!(!p.update(Some(GROUND), &[]).pound_started);

        p.jump();
        p.update(Some(GROUND), &[]);
        p.update(Some(GROUND), &[]);
        p.ground_pound();
        let step = p.update(Some(GROUND), &[]);
        assert!(step.pound_started);
        assert!(p.vy > TERMINAL_VELOCITY * 0.5);

        let mut impacts = 0;
        for _ in 0..60 {
            if p.update(Some(GROUND), &[]).pound_impact {
                impacts += 1;
            }
        }
        assert_eq!(impacts, 1);
        assert!(!p.pounding);
    }

    #[test]
    fn test_pound_raises_fall_cap() {
        let mut p = grounded();
        p.y = 0.0;
        p.on_ground = false;
        p.ground_pound();
        for _ in 0..30 {
            p.update(None, &[]);
        }
        assert!(p.vy > TERMINAL_VELOCITY);
        assert!(p.vy <= POUND_TERMINAL_VELOCITY);
    }

    #[test]
    fn test_lands_on_platform_from_above_only() {
        let platform = Platform::new(1, 60.0, GROUND - 120.0, 200.0, 16.0);
        let mut p = grounded();
        p.y = GROUND - 200.0;
        p.on_ground = false;
        let mut landed = false;
        for _ in 0..60 {
            if p.update(Some(GROUND), std::slice::from_ref(&platform)).landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(p.bottom(), platform.top());
        assert_eq!(p.support, Some(1));

        // Jumping up through the platform from below never snaps onto it mid-rise
        let mut q = grounded();
        q.jump();
        let step = q.update(Some(GROUND), std::slice::from_ref(&platform));
        assert!(!step.landed);
        assert!(q.vy < 0.0);
    }

    #[test]
    fn test_damage_order() {
        let mut p = grounded();
        p.effects.grant(EffectKind::Shield, 600);
        assert_eq!(p.damage(), Damage::Absorbed);
        assert_eq!(p.hp, HP_MAX);
        assert!(!p.effects.is_active(EffectKind::Shield));
        // Still invincible from the absorbed hit
        assert_eq!(p.damage(), Damage::Ignored);

        p.effects.clear();
        p.effects.grant(EffectKind::Star, 100);
        assert_eq!(p.damage(), Damage::Ignored);

        p.effects.clear();
        assert_eq!(p.damage(), Damage::Taken);
        assert_eq!(p.hp, HP_MAX - 1);
    }

    #[test]
    fn test_heal_clamped() {
        let mut p = grounded();
        p.heal();
        assert_eq!(p.hp, HP_MAX);
        p.hp = 1;
        p.heal();
        assert_eq!(p.hp, 2);

        let mut tough = Player::new(100.0, GROUND, u8::MAX);
        tough.heal();
        assert_eq!(tough.hp, u8::MAX);
    }

    #[test]
    fn test_bounce_applied_next_update() {
        let mut p = grounded();
        p.bounce(SPRING_VELOCITY);
        assert!(p.on_ground);
        let step = p.update(Some(GROUND), &[]);
        assert!(!step.left_ground);
        assert!(!p.on_ground);
        assert!(p.vy < 0.0);
    }
}
