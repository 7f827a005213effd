//! Best results leaderboard
//!
//! Persisted in the key-value store, tracks the top 10 finished boards.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Maximum number of results to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Pairs compared to clear the board
    pub turns: u64,
    pub rows: u32,
    pub columns: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// Higher score first, fewer turns breaks ties
    fn beats(&self, other: &HighScoreEntry) -> bool {
        self.score > other.score || (self.score == other.score && self.turns < other.turns)
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "memory_match_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a result qualifies for the leaderboard
    pub fn qualifies(&self, entry: &HighScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| entry.beats(e)).unwrap_or(true)
    }

    /// Add a result (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(&entry) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.beats(e));
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Best result recorded for a board size
    pub fn best_for(&self, rows: u32, columns: u32) -> Option<&HighScoreEntry> {
        self.entries
            .iter()
            .find(|e| e.rows == rows && e.columns == columns)
    }

    pub fn load(store: &impl KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                log::info!("Loaded {} high scores", scores.entries.len());
                return scores;
            }
            log::warn!("High score table unreadable, starting fresh");
        }

        Self::new()
    }

    pub fn save(&self, store: &mut impl KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            store.set(Self::STORAGE_KEY, &json);
            log::info!("High scores saved ({} entries)", self.entries.len());
        }
    }
}
