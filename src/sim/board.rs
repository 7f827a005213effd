//! Cards, boards and deal generation

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Visible state of a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardStatus {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

/// A card on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Position on the board (row-major, fixed for the session)
    pub index: usize,
    /// Pairing key, shared with exactly one other card
    pub value: u32,
    pub status: CardStatus,
}

impl Card {
    pub fn new(index: usize, value: u32) -> Self {
        Self {
            index,
            value,
            status: CardStatus::FaceDown,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.status == CardStatus::Matched
    }
}

/// Check that a board of `rows` x `columns` can hold whole pairs
pub fn validate_dimensions(rows: u32, columns: u32) -> Result<usize> {
    let invalid = GameError::InvalidDimensions { rows, columns };
    let total = (rows as usize).checked_mul(columns as usize).ok_or(invalid)?;
    if total < 2 || total % 2 != 0 {
        return Err(invalid);
    }
    Ok(total)
}

/// Ordered cards laid out in a grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: u32,
    columns: u32,
    cards: Vec<Card>,
}

impl Board {
    /// Deal a shuffled board for the given dimensions
    ///
    /// Values `0..pairs` are laid out twice each and then shuffled with an
    /// unbiased Fisher-Yates pass driven by `rng`.
    pub fn generate<R: Rng + ?Sized>(rows: u32, columns: u32, rng: &mut R) -> Result<Self> {
        let total = validate_dimensions(rows, columns)?;
        let pairs = (total / 2) as u32;

        let mut values: Vec<u32> = (0..pairs).flat_map(|v| [v, v]).collect();
        values.shuffle(rng);

        log::debug!("Dealt {}x{} board ({} pairs)", rows, columns, pairs);
        Ok(Self::from_values_unchecked(rows, columns, values))
    }

    /// Build a board from an explicit layout (used for restores and fixed deals)
    ///
    /// The caller guarantees `values.len() == rows * columns`.
    pub(crate) fn from_values_unchecked(rows: u32, columns: u32, values: Vec<u32>) -> Self {
        let cards = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Card::new(index, value))
            .collect();
        Self {
            rows,
            columns,
            cards,
        }
    }

    /// Build a board from an explicit layout, checking dimensions and pairing
    pub fn from_values(rows: u32, columns: u32, values: Vec<u32>) -> Result<Self> {
        let total = validate_dimensions(rows, columns)?;
        if values.len() != total || unpaired_value(&values).is_some() {
            return Err(GameError::InvalidLayout);
        }
        Ok(Self::from_values_unchecked(rows, columns, values))
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn set_status(&mut self, index: usize, status: CardStatus) {
        self.cards[index].status = status;
    }

    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.cards.iter().map(|c| c.value)
    }

    pub fn matched_flags(&self) -> impl Iterator<Item = bool> + '_ {
        self.cards.iter().map(Card::is_matched)
    }

    pub fn all_matched(&self) -> bool {
        self.cards.iter().all(Card::is_matched)
    }

    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched()).count()
    }
}

/// First value whose multiplicity is not exactly two, if any
pub(crate) fn unpaired_value(values: &[u32]) -> Option<u32> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mut prev: Option<u32> = None;
    for chunk in sorted.chunks(2) {
        match chunk {
            [a, b] if a == b && Some(*a) != prev => prev = Some(*a),
            [a, ..] => return Some(*a),
            [] => break,
        }
    }
    None
}
