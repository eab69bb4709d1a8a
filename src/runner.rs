//! Host-facing engine
//!
//! `EndlessRunner` owns one run: the deterministic state, the balance table,
//! the player's preferences and the two collaborators (audio sink, progress
//! tracker). Hosts either step it frame by frame with `update` or hand it
//! wall-clock time through `advance`, which runs a fixed-step accumulator.

use glam::Vec2;

use crate::audio::{AudioManager, AudioSink};
use crate::consts::*;
use crate::progress::{Cosmetics, ProgressTracker};
use crate::renderer::{DrawList, Surface, colors};
use crate::settings::Settings;
use crate::sim::aabb::Aabb;
use crate::sim::battle::{BattleReport, resolve_battle};
use crate::sim::effects::EffectKind;
use crate::sim::entities::Entity;
use crate::sim::state::{Outcome, PendingGate, RunState};
use crate::sim::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// Fixed-step accumulator: wall-clock seconds in, whole frames out
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames to simulate for `elapsed` seconds, at most `MAX_SUBSTEPS`.
    /// Backlog beyond the cap is dropped rather than carried.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.max(0.0);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// One endless-runner session
pub struct EndlessRunner {
    state: RunState,
    tuning: Tuning,
    settings: Settings,
    cosmetics: Cosmetics,
    progress: Box<dyn ProgressTracker>,
    audio: AudioManager,
    clock: FrameClock,
    /// Edge inputs waiting for the next simulated frame
    latched: TickInput,
}

impl EndlessRunner {
    /// Start a run in a `width` x `height` logical viewport
    pub fn new(
        width: f32,
        height: f32,
        seed: u64,
        tuning: Tuning,
        settings: Settings,
        progress: Box<dyn ProgressTracker>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let state = RunState::new(seed, width, height, &tuning);
        log::info!("Run started with seed: {}", seed);
        Self::from_state(state, tuning, settings, progress, audio)
    }

    /// Continue a run from `RunState::snapshot` output
    pub fn from_snapshot(
        json: &str,
        tuning: Tuning,
        settings: Settings,
        progress: Box<dyn ProgressTracker>,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self, serde_json::Error> {
        let state = RunState::restore(json)?;
        log::info!("Continuing run at {:.0} m", state.distance_m());
        Ok(Self::from_state(state, tuning, settings, progress, audio))
    }

    fn from_state(
        state: RunState,
        tuning: Tuning,
        settings: Settings,
        progress: Box<dyn ProgressTracker>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let cosmetics = progress.equipped();
        let mut runner = Self {
            state,
            tuning,
            settings: Settings::default(),
            cosmetics,
            progress,
            audio: AudioManager::new(audio),
            clock: FrameClock::new(),
            latched: TickInput::default(),
        };
        runner.apply_settings(settings);
        runner
    }

    /// Swap preferences mid-run (particle cap, volume)
    pub fn apply_settings(&mut self, settings: Settings) {
        self.state.max_particles = settings.max_particles();
        self.state.particles.truncate(self.state.max_particles);
        self.audio.set_master_volume(settings.master_volume);
        self.audio.set_sfx_volume(settings.sfx_volume);
        self.settings = settings;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Simulate exactly one frame
    pub fn update(&mut self, input: &TickInput) {
        tick(&mut self.state, input, &self.tuning);
        self.flush_events();
    }

    /// Feed wall-clock time; returns the number of frames actually simulated.
    /// Presses and releases are held until a frame actually runs.
    pub fn advance(&mut self, elapsed_secs: f32, input: &TickInput) -> u32 {
        self.latched.jump_pressed |= input.jump_pressed;
        self.latched.jump_released |= input.jump_released;
        self.latched.ground_pound |= input.ground_pound;
        self.latched.autopilot = input.autopilot;

        let steps = self.clock.advance(elapsed_secs);
        let mut ran = 0;
        for _ in 0..steps {
            if self.state.done() {
                break;
            }
            let frame_input = std::mem::replace(
                &mut self.latched,
                TickInput {
                    autopilot: input.autopilot,
                    ..TickInput::default()
                },
            );
            self.update(&frame_input);
            ran += 1;
        }
        ran
    }

    fn flush_events(&mut self) {
        let events = self.state.drain_events();
        self.audio.handle_events(&events);
    }

    pub fn done(&self) -> bool {
        self.state.done()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    /// Word and assist flag for the battle the host should run now
    pub fn pending_gate(&self) -> Option<&PendingGate> {
        self.state.pending_gate()
    }

    /// Report the battle result and resume scrolling
    pub fn resume_from_battle(&mut self, success: bool) -> Option<BattleReport> {
        let report = resolve_battle(&mut self.state, &self.tuning, success)?;
        self.progress.record_battle(&report.word, report.success);
        self.clock.reset();
        self.flush_events();
        Some(report)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn distance_m(&self) -> f32 {
        self.state.distance_m()
    }

    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        self.state.snapshot()
    }

    /// Draw list sized for the current quality preset
    pub fn new_draw_list(&self) -> DrawList {
        DrawList::new(self.settings.quality.circle_segments())
    }

    /// Draw the current frame back to front
    pub fn draw(&self, surface: &mut dyn Surface) {
        let zones = &self.tuning.zones;
        let Some(zone) = zones.get(self.state.zone.current).or_else(|| zones.first()) else {
            return;
        };
        let palette = &zone.palette;
        let state = &self.state;
        let world = &state.world;

        surface.fill_rect(Aabb::new(0.0, 0.0, state.width, state.height), palette.sky);
        surface.fill_rect(
            Aabb::new(0.0, state.ground_y, state.width, GROUND_HEIGHT),
            palette.ground,
        );
        for gap in &world.gaps {
            gap.draw(surface, palette);
        }
        for e in &world.platforms {
            e.draw(surface, palette);
        }
        for e in &world.springs {
            e.draw(surface, palette);
        }
        for e in &world.checkpoints {
            e.draw(surface, palette);
        }
        for e in &world.gates {
            e.draw(surface, palette);
        }
        for e in &world.grains {
            e.draw(surface, palette);
        }
        for e in &world.power_ups {
            e.draw(surface, palette);
        }
        for e in &world.ground_hazards {
            e.draw(surface, palette);
        }
        for e in &world.flyers {
            e.draw(surface, palette);
        }

        self.draw_player(surface);

        for p in &state.particles {
            let mut color = p.color;
            color[3] *= p.life;
            surface.fill_circle(p.pos, p.size * p.life.max(0.3), color);
        }

        if self.settings.effective_zone_flash() && state.zone.flash > 0 {
            let mut flash = colors::FLASH;
            flash[3] = 0.5 * state.zone.flash as f32 / ZONE_FLASH_FRAMES as f32;
            surface.fill_rect(Aabb::new(0.0, 0.0, state.width, state.height), flash);
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface) {
        let player = &self.state.player;
        let body = player.sprite_box();
        let center = body.center();

        if player.effects.is_active(EffectKind::Star) {
            surface.fill_circle(center, body.height() * 0.8, colors::STAR);
        } else if player.effects.is_active(EffectKind::Shield) {
            surface.fill_circle(center, body.height() * 0.7, colors::SHIELD);
        }

        // Blink while invincible
        let blink = player.effects.is_active(EffectKind::Invincible) && (self.state.frame / 4) % 2 == 0;
        let color = if blink {
            colors::PLAYER_HURT
        } else {
            self.cosmetics.tint
        };
        let squash = if self.settings.effective_squash() && player.squash > 0 {
            0.25 * player.squash as f32 / LANDING_SQUASH_FRAMES as f32
        } else {
            0.0
        };
        surface.fill_squashed_rect(body, squash, color);

        if self.cosmetics.hat.is_some() {
            surface.fill_triangle(
                Vec2::new(body.min.x + 4.0, body.min.y),
                Vec2::new(center.x, body.min.y - 14.0),
                Vec2::new(body.max.x - 4.0, body.min.y),
                color,
            );
        }
    }
}
