//! Fixed timestep simulation tick
//!
//! Core game loop that advances the run deterministically, one 60 Hz frame per
//! call: input, speed and scroll, zone, world animation, generation, player
//! physics, collision, pit falls, combo decay, particles, culling, survival.

use glam::Vec2;

use super::collision;
use super::effects::EffectKind;
use super::entities::{Entity, GroundHazardKind};
use super::player::PlayerStep;
use super::state::{GameEvent, RunPhase, RunState};
use crate::consts::*;
use crate::renderer::colors;
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Jump pressed this frame
    pub jump_pressed: bool,
    /// Jump released this frame
    pub jump_released: bool,
    pub ground_pound: bool,
    /// Built-in bot plays instead of the input above
    pub autopilot: bool,
}

/// Advance the run by one fixed frame
pub fn tick(state: &mut RunState, input: &TickInput, tuning: &Tuning) {
    if state.phase != RunPhase::Running {
        return;
    }
    state.frame += 1;

    let input = if input.autopilot {
        autopilot(state)
    } else {
        *input
    };
    if input.jump_pressed {
        state.player.jump();
    }
    if input.jump_released {
        state.player.release_jump();
    }
    if input.ground_pound {
        state.player.ground_pound();
    }

    // Speed ramp and scroll
    let distance_m = state.distance_m();
    let zone_mult = tuning
        .zones
        .get(state.zone.current)
        .map(|z| z.speed_mult)
        .unwrap_or(1.0);
    let mut speed = tuning.speed_for(distance_m) * zone_mult;
    if state.player.effects.is_active(EffectKind::SlowMo) {
        speed *= tuning.slow_mo_factor;
    }
    state.speed = speed;
    state.distance += speed;

    if let Some(index) = state.zone.update(&tuning.zones, state.distance_m()) {
        if let Some(zone) = tuning.zones.get(index) {
            log::info!("entered {} at {:.0} m", zone.name, state.distance_m());
        }
        state.push_event(GameEvent::ZoneChanged(index));
    }

    scroll_world(state, speed);
    if state.player.effects.is_active(EffectKind::Magnet) {
        attract_grains(state);
    }
    state.generate_ahead(tuning);

    let ground = state.ground_under(&state.player.hitbox());
    let step = state.player.update(ground, &state.world.platforms);
    emit_step_events(state, &step);

    collision::resolve(state, tuning, &step);
    if state.phase != RunPhase::Running {
        // Gate reached, frozen for the battle
        return;
    }

    if state.player.y > state.height + PIT_MARGIN {
        pit_fall(state);
    }

    if state.combo.tick() {
        state.push_event(GameEvent::ComboLost);
    }

    state.update_particles(speed);
    cull(state);
    check_survival(state, tuning);
}

fn scroll_world(state: &mut RunState, scroll: f32) {
    let world = &mut state.world;
    fn step<E: Entity>(items: &mut [E], scroll: f32) {
        for item in items {
            item.update_screen(scroll);
            item.update();
        }
    }
    step(&mut world.platforms, scroll);
    step(&mut world.grains, scroll);
    step(&mut world.power_ups, scroll);
    step(&mut world.ground_hazards, scroll);
    step(&mut world.gaps, scroll);
    step(&mut world.flyers, scroll);
    step(&mut world.springs, scroll);
    step(&mut world.checkpoints, scroll);
    step(&mut world.gates, scroll);
}

fn attract_grains(state: &mut RunState) {
    let center = state.player.sprite_box().center();
    for grain in state.world.grains.iter_mut() {
        if Vec2::new(grain.x, grain.y).distance(center) <= MAGNET_RADIUS {
            grain.attract(center, MAGNET_PULL);
        }
    }
}

fn emit_step_events(state: &mut RunState, step: &PlayerStep) {
    if step.jumped {
        state.push_event(GameEvent::Jump);
    }
    if step.double_jumped {
        state.push_event(GameEvent::DoubleJump);
    }
    if step.pound_started {
        state.push_event(GameEvent::GroundPoundStart);
    }
    if step.landed {
        state.push_event(GameEvent::Land);
        let feet = Vec2::new(state.player.sprite_box().center().x, state.player.bottom());
        let dust = if step.pound_impact { 14 } else { 5 };
        state.spawn_particles(feet, colors::FLASH, dust, 1.5);
    }
    if step.pound_impact {
        state.push_event(GameEvent::GroundPoundImpact);
    }
    for kind in &step.expired {
        state.push_event(GameEvent::EffectExpired(*kind));
    }
}

/// Fell through a gap: one hit, then back on solid ground
fn pit_fall(state: &mut RunState) {
    collision::hurt(state);
    state.stats.pit_falls += 1;
    let hitbox = state.player.hitbox();
    for gap in state.world.gaps.iter_mut() {
        if gap.x < hitbox.max.x && gap.x + gap.width > hitbox.min.x {
            gap.bridged = true;
        }
    }
    state.player.respawn(state.ground_y, INVINCIBLE_FRAMES);
    state.push_event(GameEvent::PitFall);
    log::debug!("pit fall at {:.0} m", state.distance_m());
}

/// Drop whatever has scrolled away or finished its exit animation
fn cull(state: &mut RunState) {
    let h = state.height;
    let world = &mut state.world;
    world.platforms.retain(|e| e.is_visible(h));
    world.grains.retain(|e| e.is_visible(h));
    world.power_ups.retain(|e| e.is_visible(h));
    world.ground_hazards.retain(|e| e.is_visible(h));
    world.gaps.retain(|e| e.is_visible(h));
    world.flyers.retain(|e| e.is_visible(h));
    world.springs.retain(|e| e.is_visible(h));
    world.checkpoints.retain(|e| e.is_visible(h));
    world.gates.retain(|e| e.is_visible(h));
}

/// Out of HP: fall back to an unspent checkpoint, else the run is over
pub(crate) fn check_survival(state: &mut RunState, tuning: &Tuning) {
    if !state.player.is_dead() || state.phase == RunPhase::Dead {
        return;
    }
    if let Some(mark) = state.checkpoint.as_mut().filter(|m| !m.spent) {
        mark.spent = true;
        let from = state.player.x;
        let cleared = state
            .world
            .clear_hazards(from, from + tuning.respawn_clear_px);
        state.player.hp = state.player.hp_max;
        state.player.respawn(state.ground_y, INVINCIBLE_FRAMES);
        state.stats.respawns += 1;
        state.push_event(GameEvent::Respawn);
        log::info!(
            "respawned from checkpoint at {:.0} m, cleared {cleared} hazards",
            state.distance_m()
        );
        return;
    }
    state.phase = RunPhase::Dead;
    state.push_event(GameEvent::Death);
    log::info!(
        "run over at {:.0} m, score {}",
        state.distance_m(),
        state.score
    );
}

/// Built-in bot: jump over what's ahead, pound onto crawlers
fn autopilot(state: &RunState) -> TickInput {
    let player = &state.player;
    let front = player.x + player.width;
    let lead = state.speed.max(1.0) * 16.0 + 24.0;
    let ahead = |x: f32, w: f32| x + w > front - 8.0 && x < front + lead;

    let ground_threat = state
        .world
        .ground_hazards
        .iter()
        .any(|h| !h.defeated && ahead(h.x, h.width))
        || state
            .world
            .gaps
            .iter()
            .any(|g| !g.bridged && ahead(g.x, g.width));
    let low_flyer = state.world.flyers.iter().any(|f| {
        !f.defeated && ahead(f.x, f.width) && f.y + f.height > state.ground_y - PLAYER_HEIGHT - 10.0
    });

    let mut input = TickInput::default();
    if player.on_ground && (ground_threat || low_flyer) {
        input.jump_pressed = true;
    }
    // Short hop when only a flyer is close, so we pass under its swing
    if !player.on_ground && player.vy < 0.0 && !ground_threat && low_flyer {
        input.jump_released = true;
    }

    let center_x = player.sprite_box().center().x;
    let over_crawler = state.world.ground_hazards.iter().any(|h| {
        h.kind == GroundHazardKind::Crawler
            && !h.defeated
            && (h.bounds().center().x - center_x).abs() < POUND_RADIUS * 0.5
    });
    if !player.on_ground && !player.pounding && player.vy > 0.0 && over_crawler {
        input.ground_pound = true;
    }
    input
}
