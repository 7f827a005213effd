//! Resumable projection of a game in progress

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::board::{Board, CardStatus, unpaired_value, validate_dimensions};
use crate::error::SnapshotError;

/// Everything needed to put a board back on the table
///
/// Face-up cards awaiting comparison are not part of a snapshot; they come
/// back face down on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: u32,
    pub columns: u32,
    pub score: u64,
    pub turns: u64,
    pub combo: u32,
    pub card_values: Vec<u32>,
    pub matched: Vec<bool>,
}

impl Snapshot {
    /// Check the snapshot describes a playable, unfinished board
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let expected = validate_dimensions(self.rows, self.columns).map_err(|_| {
            SnapshotError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            }
        })?;

        if self.card_values.len() != expected || self.matched.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                values: self.card_values.len(),
                flags: self.matched.len(),
            });
        }

        if let Some(value) = unpaired_value(&self.card_values) {
            return Err(SnapshotError::UnpairedValues { value });
        }

        // Both halves of a pair must agree, otherwise the board can never finish
        let mut first_seen: HashMap<u32, usize> = HashMap::with_capacity(expected / 2);
        for (i, &value) in self.card_values.iter().enumerate() {
            match first_seen.insert(value, i) {
                Some(j) if self.matched[i] != self.matched[j] => {
                    return Err(SnapshotError::SplitPair { value });
                }
                _ => {}
            }
        }

        // A streak only counts pairs found on this board
        let matched_pairs = self.matched.iter().filter(|&&m| m).count() / 2;
        if self.combo as usize > matched_pairs {
            return Err(SnapshotError::ComboOutOfRange {
                combo: self.combo,
                matched_pairs,
            });
        }

        if self.matched.iter().all(|&m| m) {
            return Err(SnapshotError::AlreadyComplete);
        }

        Ok(())
    }

    /// Rebuild the board, with matched cards already retired
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        self.validate()?;
        let mut board =
            Board::from_values_unchecked(self.rows, self.columns, self.card_values.clone());
        for (index, _) in self.matched.iter().enumerate().filter(|&(_, &m)| m) {
            board.set_status(index, CardStatus::Matched);
        }
        Ok(board)
    }
}
