//! Error types shared across the crate

use thiserror::Error;

/// Errors surfaced to callers that set up a game
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board dimensions {rows}x{columns}: card count must be even and at least 2")]
    InvalidDimensions { rows: u32, columns: u32 },
    #[error("Card layout does not fill the board with pairs")]
    InvalidLayout,
}

/// Reasons a persisted snapshot is rejected on load
///
/// None of these reach the player: a rejected snapshot is treated as absent
/// and a fresh board is dealt instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Missing key `{key}`")]
    Missing { key: String },
    #[error("Malformed value for key `{key}`")]
    Malformed { key: String },
    #[error("Snapshot dimensions {rows}x{columns} are not a valid board")]
    InvalidDimensions { rows: u32, columns: u32 },
    #[error("Expected {expected} entries, found {values} card values and {flags} matched flags")]
    LengthMismatch {
        expected: usize,
        values: usize,
        flags: usize,
    },
    #[error("Card value {value} does not appear exactly twice")]
    UnpairedValues { value: u32 },
    #[error("Only one card of pair {value} is marked matched")]
    SplitPair { value: u32 },
    #[error("Combo streak {combo} exceeds the {matched_pairs} pairs already found")]
    ComboOutOfRange { combo: u32, matched_pairs: usize },
    #[error("Every card is already matched")]
    AlreadyComplete,
}

/// Failures of a durable key-value backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage backend unavailable")]
    Unavailable,
}

pub type Result<T> = core::result::Result<T, GameError>;
