//! World entities
//!
//! A closed set of entity kinds, each stored in its own arena so the collision
//! pass can walk them in a fixed, typed order. All share the `Entity`
//! capability set: scroll, animate, visibility, draw, and a bounding box.
//! X coordinates are screen-relative and shift left as the camera scrolls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::effects::EffectKind;
use super::zone::Palette;
use crate::consts::*;
use crate::renderer::{Surface, colors};

/// Shared per-frame capabilities of every world object
pub trait Entity {
    fn bounds(&self) -> Aabb;

    /// Apply camera scroll (pixels moved this frame)
    fn update_screen(&mut self, scroll: f32);

    /// Internal animation / patrol
    fn update(&mut self) {}

    /// False once the object can be culled
    fn is_visible(&self, screen_height: f32) -> bool {
        let b = self.bounds();
        b.max.x > -CULL_MARGIN && b.min.y < screen_height + PIT_MARGIN
    }

    fn draw(&self, surface: &mut dyn Surface, palette: &Palette);

    fn collides(&self, hitbox: &Aabb) -> bool {
        self.bounds().overlaps(hitbox)
    }
}

// === Platform ===

/// Angular speed of oscillating platforms (radians/frame)
const PLATFORM_FREQUENCY: f32 = 0.035;

/// One-way platform, optionally bobbing vertically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub base_y: f32,
    prev_y: f32,
    pub amplitude: f32,
    pub phase: f32,
    age: u32,
}

impl Platform {
    pub fn new(id: u32, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            base_y: y,
            prev_y: y,
            amplitude: 0.0,
            phase: 0.0,
            age: 0,
        }
    }

    pub fn oscillating(
        id: u32,
        x: f32,
        base_y: f32,
        width: f32,
        height: f32,
        amplitude: f32,
        phase: f32,
    ) -> Self {
        let y = base_y + amplitude * phase.sin();
        Self {
            y,
            prev_y: y,
            base_y,
            amplitude,
            phase,
            ..Self::new(id, x, y, width, height)
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Top surface as of the previous frame
    #[inline]
    pub fn prev_top(&self) -> f32 {
        self.prev_y
    }
}

impl Entity for Platform {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.prev_y = self.y;
        if self.amplitude > 0.0 {
            self.age += 1;
            self.y = self.base_y
                + self.amplitude * (self.phase + self.age as f32 * PLATFORM_FREQUENCY).sin();
        }
    }

    fn draw(&self, surface: &mut dyn Surface, palette: &Palette) {
        surface.fill_rect(self.bounds(), palette.platform);
    }
}

// === Grain ===

pub const GRAIN_SIZE: f32 = 16.0;

/// Collectible grain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grain {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub base_y: f32,
    pub phase: f32,
    pub collected: bool,
    age: u32,
}

impl Grain {
    pub fn new(id: u32, x: f32, y: f32, phase: f32) -> Self {
        Self {
            id,
            x,
            y,
            base_y: y,
            phase,
            collected: false,
            age: 0,
        }
    }

    /// Drift toward `target` (magnet power-up)
    pub fn attract(&mut self, target: Vec2, pull: f32) {
        let pos = Vec2::new(self.x, self.y);
        let to_target = target - pos;
        let dist = to_target.length();
        if dist < 1.0 {
            return;
        }
        let step = to_target / dist * pull.min(dist);
        self.x += step.x;
        self.base_y += step.y;
        self.y += step.y;
    }

    /// Mark collected; false if it already was
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Entity for Grain {
    fn bounds(&self) -> Aabb {
        let half = GRAIN_SIZE / 2.0;
        Aabb::new(self.x - half, self.y - half, GRAIN_SIZE, GRAIN_SIZE)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.age += 1;
        self.y = self.base_y + 4.0 * (self.phase + self.age as f32 * 0.1).sin();
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        if !self.collected {
            surface.fill_circle(Vec2::new(self.x, self.y), GRAIN_SIZE / 2.0, colors::GRAIN);
        }
    }
}

// === Ground hazards ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundHazardKind {
    /// Static spikes: always hurt, can't be stomped
    Spike,
    /// Walking enemy: stompable, may wear armor
    Crawler,
}

/// Crawlers walk toward the player on top of the scroll
const CRAWLER_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundHazard {
    pub id: u32,
    pub kind: GroundHazardKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Remaining armor layers; each stomp strips one before a stomp can defeat
    pub armor: u8,
    pub defeated: bool,
    /// Frames left of harmless stagger after losing armor
    #[serde(default)]
    pub stagger: u32,
    fall_vy: f32,
}

impl GroundHazard {
    pub fn spike(id: u32, x: f32, ground_y: f32) -> Self {
        Self::new(id, GroundHazardKind::Spike, x, ground_y, 32.0, 26.0, 0)
    }

    pub fn crawler(id: u32, x: f32, ground_y: f32, armor: u8) -> Self {
        Self::new(id, GroundHazardKind::Crawler, x, ground_y, 38.0, 30.0, armor)
    }

    fn new(
        id: u32,
        kind: GroundHazardKind,
        x: f32,
        ground_y: f32,
        width: f32,
        height: f32,
        armor: u8,
    ) -> Self {
        Self {
            id,
            kind,
            x,
            y: ground_y - height,
            width,
            height,
            armor,
            defeated: false,
            stagger: 0,
            fall_vy: 0.0,
        }
    }

    pub fn stompable(&self) -> bool {
        self.kind == GroundHazardKind::Crawler
    }

    /// Knock the hazard out. Idempotent: only the first call returns true.
    pub fn defeat(&mut self) -> bool {
        if self.defeated || !self.stompable() {
            return false;
        }
        self.defeated = true;
        self.fall_vy = -4.0;
        true
    }

    /// Strip one armor layer; false when there was none
    pub fn break_armor(&mut self) -> bool {
        if self.armor == 0 || self.defeated {
            return false;
        }
        self.armor -= 1;
        self.stagger = ARMOR_STAGGER_FRAMES;
        true
    }
}

impl Entity for GroundHazard {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.stagger = self.stagger.saturating_sub(1);
        if self.defeated {
            self.fall_vy += GRAVITY;
            self.y += self.fall_vy;
        } else if self.kind == GroundHazardKind::Crawler {
            self.x -= CRAWLER_SPEED;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        let b = self.bounds();
        match self.kind {
            GroundHazardKind::Spike => {
                let teeth = 2;
                let tooth = b.width() / teeth as f32;
                for i in 0..teeth {
                    let left = b.min.x + i as f32 * tooth;
                    surface.fill_triangle(
                        Vec2::new(left, b.max.y),
                        Vec2::new(left + tooth / 2.0, b.min.y),
                        Vec2::new(left + tooth, b.max.y),
                        colors::SPIKE,
                    );
                }
            }
            GroundHazardKind::Crawler => {
                let color = if self.armor > 0 {
                    colors::ARMOR
                } else {
                    colors::CRAWLER
                };
                surface.fill_rect(b, color);
            }
        }
    }

    fn collides(&self, hitbox: &Aabb) -> bool {
        !self.defeated && self.stagger == 0 && self.bounds().overlaps(hitbox)
    }
}

// === Gap ===

/// A span with no ground under it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    /// Ground surface height the gap cuts through
    pub ground_y: f32,
    /// Filled in after a pit-fall respawn
    pub bridged: bool,
}

impl Gap {
    pub fn new(id: u32, x: f32, width: f32, ground_y: f32) -> Self {
        Self {
            id,
            x,
            width,
            ground_y,
            bridged: false,
        }
    }

    /// True when `span` lies entirely over the open pit
    pub fn swallows(&self, span: &Aabb) -> bool {
        !self.bridged && span.min.x >= self.x && span.max.x <= self.x + self.width
    }

    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.x + self.width
    }
}

impl Entity for Gap {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.ground_y, self.width, GROUND_HEIGHT)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn is_visible(&self, _screen_height: f32) -> bool {
        self.x + self.width > -CULL_MARGIN
    }

    fn draw(&self, surface: &mut dyn Surface, palette: &Palette) {
        let color = if self.bridged { palette.platform } else { colors::PIT };
        surface.fill_rect(self.bounds(), color);
    }

    fn collides(&self, hitbox: &Aabb) -> bool {
        self.swallows(hitbox)
    }
}

// === Flying hazard ===

const FLYER_SPEED: f32 = 1.5;
const FLYER_BOB: f32 = 18.0;

/// Pterodactyl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub base_y: f32,
    pub width: f32,
    pub height: f32,
    pub phase: f32,
    pub armor: u8,
    pub defeated: bool,
    #[serde(default)]
    pub stagger: u32,
    fall_vy: f32,
    age: u32,
}

impl Flyer {
    pub fn new(id: u32, x: f32, base_y: f32, phase: f32, armor: u8) -> Self {
        Self {
            id,
            x,
            y: base_y + FLYER_BOB * phase.sin(),
            base_y,
            width: 44.0,
            height: 28.0,
            phase,
            armor,
            defeated: false,
            stagger: 0,
            fall_vy: 0.0,
            age: 0,
        }
    }

    /// Idempotent: only the first call returns true
    pub fn defeat(&mut self) -> bool {
        if self.defeated {
            return false;
        }
        self.defeated = true;
        self.fall_vy = -3.0;
        true
    }

    pub fn break_armor(&mut self) -> bool {
        if self.armor == 0 || self.defeated {
            return false;
        }
        self.armor -= 1;
        self.stagger = ARMOR_STAGGER_FRAMES;
        true
    }
}

impl Entity for Flyer {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.stagger = self.stagger.saturating_sub(1);
        if self.defeated {
            self.fall_vy += GRAVITY;
            self.y += self.fall_vy;
            return;
        }
        self.age += 1;
        self.x -= FLYER_SPEED;
        self.y = self.base_y + FLYER_BOB * (self.phase + self.age as f32 * 0.06).sin();
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        let b = self.bounds();
        let body = if self.armor > 0 {
            colors::ARMOR
        } else {
            colors::FLYER
        };
        let c = b.center();
        // Wings flap with the bob phase
        let flap = (self.phase + self.age as f32 * 0.3).sin() * b.height() * 0.5;
        surface.fill_triangle(
            Vec2::new(b.min.x, c.y + flap),
            Vec2::new(c.x, b.min.y),
            Vec2::new(b.max.x, c.y + flap),
            body,
        );
        surface.fill_circle(Vec2::new(b.min.x + 6.0, c.y), 7.0, body);
    }

    fn collides(&self, hitbox: &Aabb) -> bool {
        !self.defeated && self.stagger == 0 && self.bounds().overlaps(hitbox)
    }
}

// === Power-ups ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    DoubleJump,
    Magnet,
    SlowMo,
    Star,
    /// Restores one HP
    Heart,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Shield,
        PowerUpKind::DoubleJump,
        PowerUpKind::Magnet,
        PowerUpKind::SlowMo,
        PowerUpKind::Star,
        PowerUpKind::Heart,
    ];

    /// Timed effect granted on pickup
    pub fn effect(self) -> Option<EffectKind> {
        match self {
            PowerUpKind::Shield => Some(EffectKind::Shield),
            PowerUpKind::DoubleJump => Some(EffectKind::DoubleJump),
            PowerUpKind::Magnet => Some(EffectKind::Magnet),
            PowerUpKind::SlowMo => Some(EffectKind::SlowMo),
            PowerUpKind::Star => Some(EffectKind::Star),
            PowerUpKind::Heart => None,
        }
    }

    fn color(self) -> [f32; 4] {
        match self {
            PowerUpKind::Shield => [0.4, 0.8, 1.0, 1.0],
            PowerUpKind::DoubleJump => [0.5, 1.0, 0.6, 1.0],
            PowerUpKind::Magnet => [1.0, 0.3, 0.3, 1.0],
            PowerUpKind::SlowMo => [0.7, 0.5, 1.0, 1.0],
            PowerUpKind::Star => [1.0, 0.95, 0.3, 1.0],
            PowerUpKind::Heart => [1.0, 0.45, 0.6, 1.0],
        }
    }
}

pub const POWER_UP_SIZE: f32 = 26.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    pub base_y: f32,
    pub phase: f32,
    pub collected: bool,
    age: u32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, x: f32, y: f32, phase: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            base_y: y,
            phase,
            collected: false,
            age: 0,
        }
    }

    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Entity for PowerUp {
    fn bounds(&self) -> Aabb {
        let half = POWER_UP_SIZE / 2.0;
        Aabb::new(self.x - half, self.y - half, POWER_UP_SIZE, POWER_UP_SIZE)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.age += 1;
        self.y = self.base_y + 6.0 * (self.phase + self.age as f32 * 0.08).sin();
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        if !self.collected {
            surface.fill_circle(Vec2::new(self.x, self.y), POWER_UP_SIZE / 2.0, self.kind.color());
        }
    }
}

// === Gate ===

/// Phonics gate: touching it hands the run over to a blend battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub triggered: bool,
}

impl Gate {
    pub fn new(id: u32, x: f32, ground_y: f32, screen_height: f32) -> Self {
        // Full-height so it can't be jumped over
        Self {
            id,
            x,
            y: -screen_height,
            width: 40.0,
            height: ground_y + screen_height,
            triggered: false,
        }
    }

    /// Only the first call returns true
    pub fn trigger(&mut self) -> bool {
        !std::mem::replace(&mut self.triggered, true)
    }
}

impl Entity for Gate {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn is_visible(&self, _screen_height: f32) -> bool {
        self.x + self.width > -CULL_MARGIN
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        let b = self.bounds();
        let alpha = if self.triggered { 0.3 } else { 1.0 };
        let mut color = colors::GATE;
        color[3] *= alpha;
        surface.fill_rect(Aabb::new(b.min.x, 0.0, 8.0, b.max.y), color);
        surface.fill_rect(Aabb::new(b.max.x - 8.0, 0.0, 8.0, b.max.y), color);
    }
}

// === Checkpoint ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub activated: bool,
}

impl Checkpoint {
    pub const WIDTH: f32 = 12.0;
    pub const HEIGHT: f32 = 90.0;

    pub fn new(id: u32, x: f32, ground_y: f32) -> Self {
        Self {
            id,
            x,
            y: ground_y - Self::HEIGHT,
            activated: false,
        }
    }

    /// Only the first call returns true
    pub fn activate(&mut self) -> bool {
        !std::mem::replace(&mut self.activated, true)
    }
}

impl Entity for Checkpoint {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, Self::WIDTH, Self::HEIGHT)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        let b = self.bounds();
        let flag = if self.activated {
            colors::CHECKPOINT_LIT
        } else {
            colors::CHECKPOINT_IDLE
        };
        surface.fill_rect(Aabb::new(b.min.x, b.min.y, 4.0, b.height()), colors::CHECKPOINT_IDLE);
        surface.fill_triangle(
            b.min + Vec2::new(4.0, 0.0),
            b.min + Vec2::new(34.0, 12.0),
            b.min + Vec2::new(4.0, 24.0),
            flag,
        );
    }
}

// === Spring ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spring {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Frames before it can launch again
    pub cooldown: u32,
}

impl Spring {
    pub fn new(id: u32, x: f32, ground_y: f32) -> Self {
        Self {
            id,
            x,
            y: ground_y - 18.0,
            width: 34.0,
            height: 18.0,
            cooldown: 0,
        }
    }

    /// Launch if ready; starts the cooldown
    pub fn trigger(&mut self) -> bool {
        if self.cooldown > 0 {
            return false;
        }
        self.cooldown = SPRING_COOLDOWN_FRAMES;
        true
    }
}

impl Entity for Spring {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    fn update_screen(&mut self, scroll: f32) {
        self.x -= scroll;
    }

    fn update(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    fn draw(&self, surface: &mut dyn Surface, _palette: &Palette) {
        // Compressed right after a launch
        let squash = if self.cooldown > SPRING_COOLDOWN_FRAMES / 2 {
            0.4
        } else {
            0.0
        };
        surface.fill_squashed_rect(self.bounds(), squash, colors::SPRING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defeat_is_idempotent() {
        let mut crawler = GroundHazard::crawler(1, 100.0, 400.0, 0);
        assert!(crawler.defeat());
        assert!(!crawler.defeat());

        let mut flyer = Flyer::new(2, 100.0, 300.0, 0.0, 0);
        assert!(flyer.defeat());
        assert!(!flyer.defeat());
    }

    #[test]
    fn test_spikes_cannot_be_defeated() {
        let mut spike = GroundHazard::spike(1, 100.0, 400.0);
        assert!(!spike.defeat());
        assert!(!spike.defeated);
    }

    #[test]
    fn test_armor_layers() {
        let mut flyer = Flyer::new(1, 0.0, 200.0, 0.0, 1);
        assert!(flyer.break_armor());
        assert!(!flyer.break_armor());
        assert_eq!(flyer.armor, 0);
        assert!(!flyer.defeated);
    }

    #[test]
    fn test_stagger_after_armor_break() {
        let mut crawler = GroundHazard::crawler(1, 100.0, 400.0, 1);
        let feet = Aabb::new(100.0, 360.0, 30.0, 30.0);
        assert!(crawler.collides(&feet));
        assert!(crawler.break_armor());
        assert!(!crawler.collides(&feet));
        for _ in 0..ARMOR_STAGGER_FRAMES {
            crawler.update();
        }
        assert_eq!(crawler.stagger, 0);
        assert!(crawler.collides(&feet));
    }

    #[test]
    fn test_oscillating_platform_tracks_previous_top() {
        let mut p = Platform::oscillating(1, 0.0, 300.0, 100.0, 16.0, 40.0, 0.0);
        assert_eq!(p.top(), 300.0);
        p.update();
        assert_eq!(p.prev_top(), 300.0);
        assert!(p.top() > 300.0);
        let before = p.top();
        p.update();
        assert_eq!(p.prev_top(), before);
    }

    #[test]
    fn test_spring_cooldown() {
        let mut spring = Spring::new(1, 0.0, 400.0);
        assert!(spring.trigger());
        assert!(!spring.trigger());
        for _ in 0..SPRING_COOLDOWN_FRAMES {
            spring.update();
        }
        assert!(spring.trigger());
    }

    #[test]
    fn test_one_shot_flags() {
        let mut gate = Gate::new(1, 0.0, 400.0, 540.0);
        assert!(gate.trigger());
        assert!(!gate.trigger());

        let mut cp = Checkpoint::new(2, 0.0, 400.0);
        assert!(cp.activate());
        assert!(!cp.activate());

        let mut grain = Grain::new(3, 0.0, 0.0, 0.0);
        assert!(grain.collect());
        assert!(!grain.collect());
    }

    #[test]
    fn test_gap_swallows_only_fully_inside() {
        let gap = Gap::new(1, 100.0, 120.0, 476.0);
        assert!(gap.swallows(&Aabb::new(110.0, 400.0, 24.0, 36.0)));
        assert!(!gap.swallows(&Aabb::new(90.0, 400.0, 24.0, 36.0)));
    }

    #[test]
    fn test_magnet_pull() {
        let mut grain = Grain::new(1, 100.0, 100.0, 0.0);
        grain.attract(Vec2::new(0.0, 100.0), 10.0);
        assert!((grain.x - 90.0).abs() < 1e-4);
        // Never overshoots
        grain.attract(Vec2::new(89.0, 100.0), 50.0);
        assert!((grain.x - 89.0).abs() < 1e-4);
    }

    #[test]
    fn test_culling_visibility() {
        let mut spike = GroundHazard::spike(1, 10.0, 400.0);
        assert!(spike.is_visible(540.0));
        spike.update_screen(200.0);
        assert!(!spike.is_visible(540.0));
    }
}
