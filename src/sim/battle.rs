//! Battle hand-off
//!
//! Reaching a gate freezes the run and exposes a `PendingGate`. The host plays
//! the blend battle and reports back through `resolve_battle`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{award, hurt};
use super::effects::EffectKind;
use super::state::{GameEvent, PendingGate, RunPhase, RunState};
use crate::tuning::Tuning;

/// Practice words, short vowels and common blends
pub const PHONICS_WORDS: &[&str] = &[
    "cat", "dog", "sun", "pig", "hat", "bed", "cup", "fox", "map", "net", "frog", "ship", "chip",
    "stop", "flag", "crab", "drum", "plum", "sled", "swim", "trip", "clap", "snap", "grin",
    "spot", "fish", "duck", "jump", "milk", "nest", "lamp", "moth", "shell", "thin", "truck",
];

/// Mixes the battle index into the run seed
const WORD_SEED_MIX: u64 = 0xD1B5_4A32_D192_ED03;

/// Result of a resolved battle, for the progress collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct BattleReport {
    pub word: String,
    pub success: bool,
    pub distance_m: f32,
}

/// Seeded word pick that never repeats the previous word
pub fn choose_word(seed: u64, battle_index: u32, last: Option<&str>) -> &'static str {
    let mut rng = Pcg32::seed_from_u64(seed ^ (battle_index as u64 + 1).wrapping_mul(WORD_SEED_MIX));
    let mut index = rng.random_range(0..PHONICS_WORDS.len());
    if last == Some(PHONICS_WORDS[index]) {
        index = (index + 1) % PHONICS_WORDS.len();
    }
    PHONICS_WORDS[index]
}

/// Freeze the run at a gate
pub(crate) fn begin_battle(state: &mut RunState, tuning: &Tuning) {
    let word = choose_word(state.seed, state.battles, state.last_word.as_deref());
    let auto_assist = state.consecutive_failures >= tuning.assist_after_failures
        || state.player.hp == 1;
    let pending = PendingGate {
        word: word.to_string(),
        auto_assist,
        distance_m: state.distance_m(),
    };
    log::info!(
        "gate reached at {:.0} m, word '{}'{}",
        pending.distance_m,
        pending.word,
        if auto_assist { " (assist)" } else { "" }
    );
    state.battles += 1;
    state.last_word = Some(pending.word.clone());
    state.phase = RunPhase::AwaitingBattle(pending);
    state.push_event(GameEvent::GateReached);
}

/// Apply the battle result and resume scrolling.
/// Returns `None` when no battle was pending.
pub fn resolve_battle(state: &mut RunState, tuning: &Tuning, success: bool) -> Option<BattleReport> {
    if !matches!(state.phase, RunPhase::AwaitingBattle(_)) {
        return None;
    }
    let RunPhase::AwaitingBattle(pending) = std::mem::replace(&mut state.phase, RunPhase::Running)
    else {
        return None;
    };

    if success {
        state
            .player
            .effects
            .grant(EffectKind::Invincible, tuning.battle_invincibility_frames);
        state.combo.register_success(tuning.combo_window);
        award(state, tuning, tuning.gate_reward);
        state.consecutive_failures = 0;
        state.stats.gates_cleared += 1;
        state.push_event(GameEvent::BattleWon);
    } else {
        hurt(state);
        state.consecutive_failures += 1;
        state.stats.battles_failed += 1;
        state.push_event(GameEvent::BattleLost);
    }
    log::info!(
        "battle '{}' {}",
        pending.word,
        if success { "won" } else { "lost" }
    );

    super::tick::check_survival(state, tuning);

    Some(BattleReport {
        word: pending.word,
        success,
        distance_m: pending.distance_m,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_gate(state: &mut RunState, tuning: &Tuning) {
        begin_battle(state, tuning);
        assert!(state.done());
    }

    #[test]
    fn test_word_never_repeats() {
        let mut last: Option<&str> = None;
        for i in 0..200 {
            let word = choose_word(12345, i, last);
            assert_ne!(Some(word), last);
            last = Some(word);
        }
    }

    #[test]
    fn test_word_is_seeded() {
        assert_eq!(choose_word(9, 3, None), choose_word(9, 3, None));
    }

    #[test]
    fn test_success_grants_invincibility_and_reward() {
        let tuning = Tuning::default();
        let mut state = RunState::new(1, 960.0, 540.0, &tuning);
        at_gate(&mut state, &tuning);
        let report = resolve_battle(&mut state, &tuning, true).expect("pending battle");
        assert!(report.success);
        assert!(!state.done());
        assert_eq!(state.score, tuning.gate_reward);
        assert_eq!(state.combo.streak, 1);
        assert!(state.player.effects.is_active(EffectKind::Invincible));
        // Nothing left to resolve
        assert!(resolve_battle(&mut state, &tuning, true).is_none());
    }

    #[test]
    fn test_failures_enable_assist() {
        let tuning = Tuning::default();
        let mut state = RunState::new(1, 960.0, 540.0, &tuning);
        state.player.hp_max = 10;
        state.player.hp = 10;
        for _ in 0..tuning.assist_after_failures {
            at_gate(&mut state, &tuning);
            assert!(!state.pending_gate().is_some_and(|g| g.auto_assist));
            resolve_battle(&mut state, &tuning, false);
            state.player.effects.clear();
        }
        at_gate(&mut state, &tuning);
        assert!(state.pending_gate().is_some_and(|g| g.auto_assist));
        assert_eq!(state.player.hp, 10 - tuning.assist_after_failures as u8);
    }

    #[test]
    fn test_low_hp_enables_assist() {
        let tuning = Tuning::default();
        let mut state = RunState::new(1, 960.0, 540.0, &tuning);
        state.player.hp = 1;
        at_gate(&mut state, &tuning);
        assert!(state.pending_gate().is_some_and(|g| g.auto_assist));
    }

    #[test]
    fn test_failure_at_one_hp_ends_run() {
        let tuning = Tuning::default();
        let mut state = RunState::new(1, 960.0, 540.0, &tuning);
        state.player.hp = 1;
        at_gate(&mut state, &tuning);
        resolve_battle(&mut state, &tuning, false);
        assert_eq!(state.outcome(), Some(crate::sim::state::Outcome::Dead));
    }
}
