//! Game settings and difficulty presets
//!
//! Persisted separately from game saves, as JSON under a single key.

use serde::{Deserialize, Serialize};

use crate::consts::REVEAL_DELAY;
use crate::error::Result;
use crate::persistence::{DEFAULT_SLOT, KeyValueStore};
use crate::sim::validate_dimensions;

/// Board size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    Expert,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Master => "Master",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            "master" | "max" => Some(Difficulty::Master),
            _ => None,
        }
    }

    /// Board size as (rows, columns)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (2, 2),
            Difficulty::Normal => (2, 3),
            Difficulty::Hard => (3, 4),
            Difficulty::Expert => (4, 4),
            Difficulty::Master => (5, 6),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Board rows for new games
    pub rows: u32,
    /// Board columns for new games
    pub columns: u32,
    /// Seconds both cards of a pair stay visible before they resolve
    #[serde(default = "default_reveal_delay")]
    pub reveal_delay: f32,
    /// Save slot resumed on start
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_reveal_delay() -> f32 {
    REVEAL_DELAY
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::default())
    }
}

impl Settings {
    /// Settings for a preset board size
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let (rows, columns) = difficulty.dimensions();
        Self {
            rows,
            columns,
            reveal_delay: REVEAL_DELAY,
            slot: default_slot(),
        }
    }

    /// Switch to a preset board size, keeping other preferences
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        (self.rows, self.columns) = difficulty.dimensions();
    }

    /// Preset matching the current board size, if any
    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.dimensions() == (self.rows, self.columns))
    }

    /// Check the board size can be dealt
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.rows, self.columns).map(|_| ())
    }

    /// Store key
    const STORAGE_KEY: &'static str = "memory_match_settings";

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut impl KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
