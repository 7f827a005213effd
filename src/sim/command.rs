//! Commands emitted by the engine for the presentation layer and host

use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;

/// Sound cues the presentation layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// A card was turned face up
    Flip,
    /// Two revealed cards matched
    Match,
    /// Two revealed cards differed
    Mismatch,
    /// The last pair was found
    GameOver,
}

/// Instructions produced by the engine, in the order they should be applied
///
/// The engine never waits on any of these. Presentation commands are
/// fire-and-forget; `PersistSnapshot` and `ClearSave` are handled by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Turn a card face up
    Flip(usize),
    /// Turn a card back face down
    Unflip(usize),
    /// Retire a card from play
    MarkMatched(usize),
    PlaySound(SoundEffect),
    /// Pop the combo counter (only sent for streaks above 1)
    ShowCombo(u32),
    /// Shake a card after a mismatch
    PunchFeedback(usize),
    /// Both cards of a pair are showing; the result lands after `seconds`
    RevealDelay {
        first: usize,
        second: usize,
        seconds: f32,
    },
    /// Write this state to the save slot
    PersistSnapshot(Snapshot),
    GameOver { score: u64, turns: u64 },
    /// Drop the save slot, the board is finished
    ClearSave,
}

impl Command {
    /// True for commands the host handles instead of the presentation layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Command::PersistSnapshot(_) | Command::ClearSave)
    }
}
