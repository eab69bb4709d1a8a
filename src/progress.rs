//! Progress collaborator
//!
//! The runner reads the equipped cosmetics once when a run starts and reports
//! each battle outcome once. Storage, the shop and achievements live behind this
//! trait in the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::renderer::{Color, colors};

/// Equipped look for the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cosmetics {
    pub skin: String,
    /// Body color
    pub tint: Color,
    /// Hat drawn on top of the sprite
    pub hat: Option<String>,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            skin: "classic".to_string(),
            tint: colors::PLAYER,
            hat: None,
        }
    }
}

/// Host-side progress store
pub trait ProgressTracker {
    /// Cosmetics to use for this run
    fn equipped(&self) -> Cosmetics;

    /// A battle at a gate finished
    fn record_battle(&mut self, word: &str, success: bool);
}

/// Attempts on one practice word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStats {
    pub attempts: u32,
    pub successes: u32,
}

/// In-memory tracker; serializable so a host can persist it as-is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryProgress {
    pub cosmetics: Cosmetics,
    pub words: BTreeMap<String, WordStats>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cosmetics(cosmetics: Cosmetics) -> Self {
        Self {
            cosmetics,
            ..Self::default()
        }
    }

    /// Overall success rate, `None` before any battle
    pub fn accuracy(&self) -> Option<f32> {
        let (attempts, successes) = self
            .words
            .values()
            .fold((0, 0), |(a, s), w| (a + w.attempts, s + w.successes));
        (attempts > 0).then(|| successes as f32 / attempts as f32)
    }

    /// Words missed more often than blended, worst first
    pub fn words_to_review(&self) -> Vec<&str> {
        let mut weak: Vec<(&str, &WordStats)> = self
            .words
            .iter()
            .filter(|(_, s)| s.successes * 2 < s.attempts)
            .map(|(w, s)| (w.as_str(), s))
            .collect();
        weak.sort_by_key(|(_, s)| std::cmp::Reverse(s.attempts - s.successes));
        weak.into_iter().map(|(w, _)| w).collect()
    }
}

impl ProgressTracker for MemoryProgress {
    fn equipped(&self) -> Cosmetics {
        self.cosmetics.clone()
    }

    fn record_battle(&mut self, word: &str, success: bool) {
        let stats = self.words.entry(word.to_string()).or_default();
        stats.attempts += 1;
        if success {
            stats.successes += 1;
        }
    }
}
