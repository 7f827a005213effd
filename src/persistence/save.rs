//! Save slot codec
//!
//! A snapshot is stored as one flat record per slot:
//!
//! ```text
//! <slot>.rows          integer
//! <slot>.columns       integer
//! <slot>.score         integer
//! <slot>.turns         integer
//! <slot>.combo         integer
//! <slot>.cardValues    comma-separated integers
//! <slot>.matchedFlags  comma-separated 0/1
//! <slot>.hasSave       "0" | "1"
//! ```

use std::str::FromStr;

use super::store::KeyValueStore;
use crate::error::SnapshotError;
use crate::sim::Snapshot;

/// Slot name used when none is configured
pub const DEFAULT_SLOT: &str = "memory_match";

const ROWS: &str = "rows";
const COLUMNS: &str = "columns";
const SCORE: &str = "score";
const TURNS: &str = "turns";
const COMBO: &str = "combo";
const CARD_VALUES: &str = "cardValues";
const MATCHED_FLAGS: &str = "matchedFlags";
const HAS_SAVE: &str = "hasSave";

const FIELDS: [&str; 7] = [ROWS, COLUMNS, SCORE, TURNS, COMBO, CARD_VALUES, MATCHED_FLAGS];

/// One resumable game inside a key-value store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    name: String,
}

impl Default for SaveSlot {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT)
    }
}

impl SaveSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn key(&self, field: &str) -> String {
        format!("{}.{}", self.name, field)
    }

    pub fn has_save(&self, store: &impl KeyValueStore) -> bool {
        store.get(&self.key(HAS_SAVE)).as_deref() == Some("1")
    }

    /// Write the snapshot into the slot
    ///
    /// `hasSave` drops to "0" before any field changes and only returns to
    /// "1" after the last one, so an interrupted write loads as no save
    /// rather than a mix of two games.
    pub fn save(&self, store: &mut impl KeyValueStore, snapshot: &Snapshot) {
        let has_save = self.key(HAS_SAVE);
        store.set(&has_save, "0");

        let keys = FIELDS.map(|field| self.key(field));
        let values = [
            snapshot.rows.to_string(),
            snapshot.columns.to_string(),
            snapshot.score.to_string(),
            snapshot.turns.to_string(),
            snapshot.combo.to_string(),
            join(snapshot.card_values.iter()),
            join(snapshot.matched.iter().map(|&m| u8::from(m))),
        ];
        let mut entries: Vec<(&str, &str)> = keys
            .iter()
            .zip(&values)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.push((has_save.as_str(), "1"));
        store.set_many(&entries);

        log::debug!(
            "Saved slot {} (score {}, turns {})",
            self.name,
            snapshot.score,
            snapshot.turns
        );
    }

    /// Load the slot, treating anything unusable as no save
    ///
    /// A finished board is not resumable either: saving a snapshot whose cards
    /// are all matched and loading it back yields `None`.
    pub fn load(&self, store: &impl KeyValueStore) -> Option<Snapshot> {
        match self.read(store) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Discarding save slot {}: {}", self.name, e);
                None
            }
        }
    }

    /// Load and validate the slot, reporting why it is unusable
    pub fn read(&self, store: &impl KeyValueStore) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.has_save(store) {
            return Ok(None);
        }

        let snapshot = Snapshot {
            rows: self.field(store, ROWS)?,
            columns: self.field(store, COLUMNS)?,
            score: self.field(store, SCORE)?,
            turns: self.field(store, TURNS)?,
            combo: self.field(store, COMBO)?,
            card_values: self.list(store, CARD_VALUES, |s| s.parse().ok())?,
            matched: self.list(store, MATCHED_FLAGS, |s| match s {
                "0" => Some(false),
                "1" => Some(true),
                _ => None,
            })?,
        };
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    pub fn clear(&self, store: &mut impl KeyValueStore) {
        store.set(&self.key(HAS_SAVE), "0");
        for field in FIELDS {
            store.remove(&self.key(field));
        }
        log::info!("Cleared save slot {}", self.name);
    }

    fn raw(&self, store: &impl KeyValueStore, field: &str) -> Result<String, SnapshotError> {
        store.get(&self.key(field)).ok_or_else(|| SnapshotError::Missing {
            key: self.key(field),
        })
    }

    fn field<T: FromStr>(&self, store: &impl KeyValueStore, field: &str) -> Result<T, SnapshotError> {
        self.raw(store, field)?
            .trim()
            .parse()
            .map_err(|_| SnapshotError::Malformed {
                key: self.key(field),
            })
    }

    fn list<T>(
        &self,
        store: &impl KeyValueStore,
        field: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Vec<T>, SnapshotError> {
        self.raw(store, field)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                parse(s).ok_or_else(|| SnapshotError::Malformed {
                    key: self.key(field),
                })
            })
            .collect()
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}
