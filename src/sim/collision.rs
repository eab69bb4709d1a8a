//! Per-category collision resolution
//!
//! Categories resolve in a fixed order each frame: grains, power-ups, ground
//! hazards, flying hazards, springs, checkpoints, gates. Platform landing is part
//! of the player update and gaps act through the ground plane, so neither needs
//! an overlap pass here. Every object is tested against the player's inset hit
//! box and resolves at most once per frame.

use glam::Vec2;

use super::aabb::Aabb;
use super::battle::begin_battle;
use super::effects::EffectKind;
use super::entities::Entity;
use super::player::{Damage, PlayerStep};
use super::state::{CheckpointMark, GameEvent, RunState};
use crate::consts::*;
use crate::renderer::colors;
use crate::tuning::Tuning;

/// What touching a hazard amounted to
#[derive(Debug, Clone, Copy, PartialEq)]
enum Contact {
    /// Defeated by a stomp (bounce) or star power (no bounce)
    Defeated { at: Vec2, bounce: bool },
    /// First stomp on an armored enemy
    ArmorBroken { at: Vec2 },
    Hit,
}

/// Falling, and the feet were above the target's midpoint before this frame's move
fn is_stomp(hitbox: &Aabb, vy: f32, target: &Aabb) -> bool {
    vy > 0.0 && hitbox.max.y - vy <= target.center().y
}

/// Resolve every category against the player for this frame
pub fn resolve(state: &mut RunState, tuning: &Tuning, step: &PlayerStep) {
    resolve_grains(state, tuning);
    resolve_power_ups(state, tuning);
    if step.pound_impact {
        pound_area(state, tuning);
    }
    resolve_ground_hazards(state, tuning);
    resolve_flyers(state, tuning);
    resolve_springs(state);
    resolve_checkpoints(state, tuning);
    // A fatal hit this frame wins over reaching the gate
    if !state.player.is_dead() {
        resolve_gates(state, tuning);
    }
}

/// Score a base reward through the combo multiplier
pub(crate) fn award(state: &mut RunState, tuning: &Tuning, base: u64) -> u64 {
    let points = state.combo.apply(base, &tuning.combo_tiers);
    state.score += points;
    points
}

/// Apply one hazard hit through the player's absorb order
pub(crate) fn hurt(state: &mut RunState) -> Damage {
    let damage = state.player.damage();
    match damage {
        Damage::Taken => {
            state.stats.hits_taken += 1;
            if state.combo.break_streak() {
                state.push_event(GameEvent::ComboLost);
            }
            state.push_event(GameEvent::Hit);
            let center = state.player.sprite_box().center();
            state.spawn_particles(center, colors::PLAYER_HURT, 12, 3.0);
            log::debug!("hit taken, hp {}/{}", state.player.hp, state.player.hp_max);
        }
        Damage::Absorbed => {
            state.push_event(GameEvent::ShieldBlock);
            let center = state.player.sprite_box().center();
            state.spawn_particles(center, colors::SHIELD, 10, 2.5);
        }
        Damage::Ignored => {}
    }
    damage
}

fn resolve_grains(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let mut collected = Vec::new();
    for grain in state.world.grains.iter_mut() {
        if grain.collides(&hitbox) && grain.collect() {
            collected.push(Vec2::new(grain.x, grain.y));
        }
    }
    for at in collected {
        award(state, tuning, tuning.grain_reward);
        state.stats.grains += 1;
        state.push_event(GameEvent::GrainCollected);
        state.spawn_particles(at, colors::GRAIN, 4, 1.5);
    }
    state.world.grains.retain(|g| !g.collected);
}

fn resolve_power_ups(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let mut collected = Vec::new();
    for item in state.world.power_ups.iter_mut() {
        if item.collides(&hitbox) && item.collect() {
            collected.push((item.kind, Vec2::new(item.x, item.y)));
        }
    }
    for (kind, at) in collected {
        match kind.effect() {
            Some(effect) => state
                .player
                .effects
                .grant(effect, tuning.power_up_frames(kind)),
            None => state.player.heal(),
        }
        state.score += tuning.power_up_reward;
        state.stats.power_ups += 1;
        state.push_event(GameEvent::PowerUpCollected(kind));
        state.spawn_particles(at, colors::FLASH, 8, 2.0);
        log::debug!("power-up {kind:?}");
    }
    state.world.power_ups.retain(|p| !p.collected);
}

/// Ground-pound landing knocks out nearby ground enemies, armor or not
fn pound_area(state: &mut RunState, tuning: &Tuning) {
    let center_x = state.player.sprite_box().center().x;
    let mut defeated = Vec::new();
    for hazard in state.world.ground_hazards.iter_mut() {
        let b = hazard.bounds();
        if (b.center().x - center_x).abs() <= POUND_RADIUS && hazard.defeat() {
            defeated.push(b.center());
        }
    }
    for at in defeated {
        state.combo.register_success(tuning.combo_window);
        award(state, tuning, tuning.stomp_reward);
        state.stats.stomps += 1;
        state.push_event(GameEvent::Stomp);
        state.spawn_particles(at, colors::CRAWLER, 10, 3.0);
    }
}

fn resolve_ground_hazards(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let vy = state.player.vy;
    let star = state.player.effects.is_active(EffectKind::Star);
    let mut contacts = Vec::new();
    for hazard in state.world.ground_hazards.iter_mut() {
        if !hazard.collides(&hitbox) {
            continue;
        }
        let b = hazard.bounds();
        if star {
            // Spikes can't be defeated; star just nullifies them
            if hazard.defeat() {
                contacts.push(Contact::Defeated {
                    at: b.center(),
                    bounce: false,
                });
            }
        } else if hazard.stompable() && is_stomp(&hitbox, vy, &b) {
            if hazard.break_armor() {
                contacts.push(Contact::ArmorBroken { at: b.center() });
            } else if hazard.defeat() {
                contacts.push(Contact::Defeated {
                    at: b.center(),
                    bounce: true,
                });
            }
        } else {
            contacts.push(Contact::Hit);
        }
    }
    apply_contacts(state, tuning, contacts);
}

fn resolve_flyers(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let vy = state.player.vy;
    let star = state.player.effects.is_active(EffectKind::Star);
    let mut contacts = Vec::new();
    for flyer in state.world.flyers.iter_mut() {
        if !flyer.collides(&hitbox) {
            continue;
        }
        let b = flyer.bounds();
        if star {
            if flyer.defeat() {
                contacts.push(Contact::Defeated {
                    at: b.center(),
                    bounce: false,
                });
            }
        } else if is_stomp(&hitbox, vy, &b) {
            if flyer.break_armor() {
                contacts.push(Contact::ArmorBroken { at: b.center() });
            } else if flyer.defeat() {
                contacts.push(Contact::Defeated {
                    at: b.center(),
                    bounce: true,
                });
            }
        } else {
            contacts.push(Contact::Hit);
        }
    }
    apply_contacts(state, tuning, contacts);
}

fn apply_contacts(state: &mut RunState, tuning: &Tuning, contacts: Vec<Contact>) {
    for contact in contacts {
        match contact {
            Contact::Defeated { at, bounce } => {
                if bounce {
                    state.player.bounce(STOMP_BOUNCE);
                }
                state.combo.register_success(tuning.combo_window);
                award(state, tuning, tuning.stomp_reward);
                state.stats.stomps += 1;
                state.push_event(GameEvent::Stomp);
                state.spawn_particles(at, colors::FLYER, 10, 3.0);
            }
            Contact::ArmorBroken { at } => {
                state.player.bounce(ARMOR_BOUNCE);
                if state.combo.break_streak() {
                    state.push_event(GameEvent::ComboLost);
                }
                state.push_event(GameEvent::ArmorBreak);
                state.spawn_particles(at, colors::ARMOR, 6, 2.0);
            }
            Contact::Hit => {
                hurt(state);
            }
        }
    }
}

fn resolve_springs(state: &mut RunState) {
    let hitbox = state.player.hitbox();
    if state.player.vy < 0.0 {
        return;
    }
    let launched = state
        .world
        .springs
        .iter_mut()
        .filter(|s| s.collides(&hitbox))
        .any(|s| s.trigger());
    if launched {
        state.player.bounce(SPRING_VELOCITY);
        state.push_event(GameEvent::SpringLaunch);
    }
}

fn resolve_checkpoints(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let activated = state
        .world
        .checkpoints
        .iter_mut()
        .filter(|c| c.collides(&hitbox))
        .any(|c| c.activate());
    if activated {
        state.checkpoint = Some(CheckpointMark {
            distance: state.distance,
            spent: false,
        });
        award(state, tuning, tuning.checkpoint_reward);
        state.push_event(GameEvent::CheckpointReached);
        log::info!("checkpoint at {:.0} m", state.distance_m());
    }
}

fn resolve_gates(state: &mut RunState, tuning: &Tuning) {
    let hitbox = state.player.hitbox();
    let triggered = state
        .world
        .gates
        .iter_mut()
        .filter(|g| g.collides(&hitbox))
        .any(|g| g.trigger());
    if triggered {
        begin_battle(state, tuning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Flyer, GroundHazard, PowerUp, PowerUpKind};
    use crate::sim::state::World;

    fn bare_state() -> RunState {
        let tuning = Tuning::default();
        let mut state = RunState::new(3, 960.0, 540.0, &tuning);
        state.world = World::default();
        state
    }

    /// Crawler right under the player's feet while falling onto it
    fn falling_onto_crawler(state: &mut RunState, armor: u8) {
        let x = state.player.x;
        let id = state.world.next_id();
        state
            .world
            .ground_hazards
            .push(GroundHazard::crawler(id, x, state.ground_y, armor));
        state.player.y = state.ground_y - 30.0 - state.player.height + 10.0;
        state.player.vy = 5.0;
        state.player.on_ground = false;
    }

    #[test]
    fn test_stomp_defeats_and_bounces() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        falling_onto_crawler(&mut state, 0);
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert!(state.world.ground_hazards[0].defeated);
        assert_eq!(state.stats.stomps, 1);
        assert_eq!(state.combo.streak, 1);
        assert_eq!(state.score, tuning.stomp_reward);
        assert_eq!(state.player.hp, tuning.hp_max);
    }

    #[test]
    fn test_armor_takes_two_stomps() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        state.combo.register_success(100);
        falling_onto_crawler(&mut state, 1);
        resolve(&mut state, &tuning, &PlayerStep::default());
        let hazard = &state.world.ground_hazards[0];
        assert_eq!(hazard.armor, 0);
        assert!(!hazard.defeated);
        assert_eq!(state.combo.streak, 0);
        assert!(state.events.contains(&GameEvent::ArmorBreak));

        // Staggered: still overlapping but harmless
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert!(!state.world.ground_hazards[0].defeated);
        assert_eq!(state.player.hp, tuning.hp_max);

        for _ in 0..ARMOR_STAGGER_FRAMES {
            state.world.ground_hazards[0].update();
        }
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert!(state.world.ground_hazards[0].defeated);
        assert_eq!(state.stats.stomps, 1);
    }

    #[test]
    fn test_side_contact_hurts() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        let id = state.world.next_id();
        let x = state.player.x + 4.0;
        state
            .world
            .ground_hazards
            .push(GroundHazard::crawler(id, x, state.ground_y, 0));
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert_eq!(state.player.hp, tuning.hp_max - 1);
        assert!(!state.world.ground_hazards[0].defeated);
    }

    #[test]
    fn test_stomp_and_pound_award_once() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        falling_onto_crawler(&mut state, 0);
        let step = PlayerStep {
            pound_impact: true,
            ..PlayerStep::default()
        };
        resolve(&mut state, &tuning, &step);
        assert_eq!(state.stats.stomps, 1);
        assert_eq!(state.score, tuning.stomp_reward);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| **e == GameEvent::Stomp)
                .count(),
            1
        );
    }

    #[test]
    fn test_star_defeats_flyer_without_damage() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        state.player.effects.grant(EffectKind::Star, 60);
        let id = state.world.next_id();
        let p = state.player.sprite_box();
        state
            .world
            .flyers
            .push(Flyer::new(id, p.min.x, p.min.y, 0.0, 1));
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert!(state.world.flyers[0].defeated);
        assert_eq!(state.player.hp, tuning.hp_max);
    }

    #[test]
    fn test_shield_absorbs_once() {
        let mut state = bare_state();
        state.player.effects.grant(EffectKind::Shield, 600);
        assert_eq!(hurt(&mut state), Damage::Absorbed);
        assert!(!state.player.effects.is_active(EffectKind::Shield));
        // Invincibility from the block covers the next hit
        assert_eq!(hurt(&mut state), Damage::Ignored);
        assert_eq!(state.player.hp, state.player.hp_max);
    }

    #[test]
    fn test_heart_heals_and_effects_granted() {
        let tuning = Tuning::default();
        let mut state = bare_state();
        state.player.hp = 1;
        let c = state.player.hitbox().center();
        let id = state.world.next_id();
        state
            .world
            .power_ups
            .push(PowerUp::new(id, PowerUpKind::Heart, c.x, c.y, 0.0));
        let id = state.world.next_id();
        state
            .world
            .power_ups
            .push(PowerUp::new(id, PowerUpKind::Magnet, c.x, c.y, 0.0));
        resolve(&mut state, &tuning, &PlayerStep::default());
        assert_eq!(state.player.hp, 2);
        assert_eq!(
            state.player.effects.remaining(EffectKind::Magnet),
            tuning.magnet_frames
        );
        assert!(state.world.power_ups.is_empty());
    }
}
