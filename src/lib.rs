//! Memory Match - a concentration card game with combo scoring
//!
//! Core modules:
//! - `sim`: Deterministic rules (deal, flip queue, pair resolution, scoring)
//! - `persistence`: Key-value backends and save slots
//! - `session`: Host wiring the engine to storage and front ends
//! - `settings`: Board size presets and preferences
//! - `platform`: Browser/native platform abstraction

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{GameError, SnapshotError, StoreError};
pub use highscores::HighScores;
pub use session::Session;
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Seconds both cards of a pair stay visible before they resolve
    pub const REVEAL_DELAY: f32 = 0.4;
}
