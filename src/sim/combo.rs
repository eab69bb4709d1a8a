//! Combo streak and score multiplier

use serde::{Deserialize, Serialize};

/// Streak threshold and the multiplier it unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTier {
    pub streak: u32,
    pub multiplier: u32,
}

/// Streak counter with timeout decay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub streak: u32,
    pub max_streak: u32,
    /// Frames until the streak lapses
    pub timeout: u32,
}

impl Combo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A success (perfect blend, stomp) extends the streak and refreshes the window
    pub fn register_success(&mut self, window: u32) {
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        self.timeout = window;
    }

    /// Unabsorbed hit: drop the streak immediately. Returns whether anything was lost.
    pub fn break_streak(&mut self) -> bool {
        let had = self.streak > 0;
        self.streak = 0;
        self.timeout = 0;
        had
    }

    /// Per-frame decay; true only on the frame the streak lapses
    pub fn tick(&mut self) -> bool {
        if self.streak == 0 {
            return false;
        }
        self.timeout = self.timeout.saturating_sub(1);
        if self.timeout == 0 {
            self.streak = 0;
            return true;
        }
        false
    }

    /// Step function of the current streak
    pub fn multiplier(&self, tiers: &[ComboTier]) -> u32 {
        tiers
            .iter()
            .filter(|t| self.streak >= t.streak)
            .map(|t| t.multiplier)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Apply the multiplier to a base reward
    pub fn apply(&self, base: u64, tiers: &[ComboTier]) -> u64 {
        base * self.multiplier(tiers) as u64
    }
}

/// Shipped tiers: 5 gives x2, 10 gives x3, 20 gives x4
pub fn default_tiers() -> Vec<ComboTier> {
    vec![
        ComboTier {
            streak: 5,
            multiplier: 2,
        },
        ComboTier {
            streak: 10,
            multiplier: 3,
        },
        ComboTier {
            streak: 20,
            multiplier: 4,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_tiers() {
        let tiers = default_tiers();
        let mut combo = Combo::new();
        assert_eq!(combo.multiplier(&tiers), 1);
        for _ in 0..5 {
            combo.register_success(100);
        }
        assert_eq!(combo.multiplier(&tiers), 2);
        for _ in 0..5 {
            combo.register_success(100);
        }
        assert_eq!(combo.multiplier(&tiers), 3);
        for _ in 0..10 {
            combo.register_success(100);
        }
        assert_eq!(combo.multiplier(&tiers), 4);
        assert_eq!(combo.apply(10, &tiers), 40);
    }

    #[test]
    fn test_timeout_resets_exactly_once() {
        let mut combo = Combo::new();
        combo.register_success(3);
        assert!(!combo.tick());
        assert!(!combo.tick());
        assert!(combo.tick());
        assert_eq!(combo.streak, 0);
        for _ in 0..10 {
            assert!(!combo.tick());
        }
    }

    #[test]
    fn test_success_refreshes_window() {
        let mut combo = Combo::new();
        combo.register_success(3);
        combo.tick();
        combo.tick();
        combo.register_success(3);
        assert!(!combo.tick());
        assert!(!combo.tick());
        assert_eq!(combo.streak, 2);
        assert_eq!(combo.max_streak, 2);
    }

    #[test]
    fn test_break_keeps_record() {
        let mut combo = Combo::new();
        combo.register_success(60);
        combo.register_success(60);
        assert!(combo.break_streak());
        assert!(!combo.break_streak());
        assert_eq!(combo.streak, 0);
        assert_eq!(combo.max_streak, 2);
        // Nothing left to decay
        assert!(!combo.tick());
    }
}
