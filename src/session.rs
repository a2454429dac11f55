//! Session score record
//!
//! Counters that outlive a single round: rounds played and the best round
//! scores. Held in memory only; `Game::reset` feeds it before rebuilding the
//! world.

use serde::{Deserialize, Serialize};

/// Maximum number of round results to keep
pub const MAX_BEST_ROUNDS: usize = 10;

/// Outcome of one finished (or abandoned) round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: u64,
    /// Ticks survived
    pub ticks: u64,
    /// Seed the round was played with
    pub seed: u64,
}

/// Per-session leaderboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    pub rounds_played: u32,
    /// Sorted by score, descending; ties keep the earlier round first
    pub best: Vec<RoundResult>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would enter the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.best.len() < MAX_BEST_ROUNDS {
            return true;
        }
        self.best.last().is_none_or(|e| score > e.score)
    }

    /// Record a round; returns the 1-indexed rank reached, if any
    pub fn record(&mut self, result: RoundResult) -> Option<usize> {
        self.rounds_played += 1;
        if !self.qualifies(result.score) {
            return None;
        }

        let pos = self
            .best
            .iter()
            .position(|e| result.score > e.score)
            .unwrap_or(self.best.len());
        self.best.insert(pos, result);
        self.best.truncate(MAX_BEST_ROUNDS);
        Some(pos + 1)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.best.first().map(|e| e.score)
    }
}
