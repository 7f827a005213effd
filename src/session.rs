//! Game session host
//!
//! Wires the match engine to its collaborators: the key-value store (saves,
//! settings, best results) and whichever front end forwards clicks. Front
//! ends hold a `Session` and feed it flips and elapsed time; every call
//! returns the engine's commands after persistence commands have been applied.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::Result;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::persistence::{KeyValueStore, SaveSlot};
use crate::platform::now_millis;
use crate::settings::Settings;
use crate::sim::{Board, Card, Command, MatchEngine};

pub struct Session<S: KeyValueStore> {
    store: S,
    settings: Settings,
    slot: SaveSlot,
    engine: MatchEngine,
    rng: Pcg32,
    high_scores: HighScores,
    restored: bool,
    last_rank: Option<usize>,
}

impl<S: KeyValueStore> Session<S> {
    /// Start with the settings persisted in `store`
    pub fn start(store: S, seed: u64) -> Result<Self> {
        let settings = Settings::load(&store);
        Self::with_settings(store, settings, seed)
    }

    /// Resume the configured save slot, or deal a fresh board
    ///
    /// Fails with `InvalidDimensions` when a fresh board is needed and the
    /// configured size cannot be dealt.
    pub fn with_settings(store: S, settings: Settings, seed: u64) -> Result<Self> {
        let slot = SaveSlot::new(settings.slot.clone());
        let mut rng = Pcg32::seed_from_u64(seed);

        let resumed = slot
            .load(&store)
            .and_then(|snapshot| match MatchEngine::restore(&snapshot, settings.reveal_delay) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    log::warn!("Discarding save slot {}: {}", slot.name(), e);
                    None
                }
            });

        let (engine, restored) = match resumed {
            Some(engine) => {
                log::info!(
                    "Resumed {}x{} board (score {}, turns {})",
                    engine.board().rows(),
                    engine.board().columns(),
                    engine.score(),
                    engine.turns()
                );
                (engine, true)
            }
            None => {
                settings.validate()?;
                let board = Board::generate(settings.rows, settings.columns, &mut rng)?;
                log::info!(
                    "Started new {}x{} board with seed {}",
                    settings.rows,
                    settings.columns,
                    seed
                );
                (MatchEngine::new(board, settings.reveal_delay), false)
            }
        };

        let high_scores = HighScores::load(&store);

        Ok(Self {
            store,
            settings,
            slot,
            engine,
            rng,
            high_scores,
            restored,
            last_rank: None,
        })
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn cards(&self) -> &[Card] {
        self.engine.cards()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the current board came from a save
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Whether a resumable save exists (drives a "Continue" option)
    pub fn has_save(&self) -> bool {
        self.slot.has_save(&self.store)
    }

    /// Leaderboard rank reached by the last finished board
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn flip(&mut self, index: usize) -> Vec<Command> {
        let commands = self.engine.flip(index);
        self.dispatch(commands)
    }

    pub fn tick(&mut self, dt: f32) -> Vec<Command> {
        let commands = self.engine.tick(dt);
        self.dispatch(commands)
    }

    pub fn finish_reveal(&mut self) -> Vec<Command> {
        let commands = self.engine.finish_reveal();
        self.dispatch(commands)
    }

    /// Abandon the current board and deal a fresh one
    pub fn new_game(&mut self) -> Result<()> {
        self.settings.validate()?;
        let board = Board::generate(self.settings.rows, self.settings.columns, &mut self.rng)?;
        self.slot.clear(&mut self.store);
        self.engine = MatchEngine::new(board, self.settings.reveal_delay);
        self.restored = false;
        self.last_rank = None;
        log::info!(
            "Started new {}x{} board",
            self.settings.rows,
            self.settings.columns
        );
        Ok(())
    }

    /// Replace the settings and start over with them
    ///
    /// Invalid settings are refused and leave the session untouched.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        if settings.slot != self.settings.slot {
            self.slot = SaveSlot::new(settings.slot.clone());
        }
        self.settings = settings;
        self.settings.save(&mut self.store);
        self.new_game()
    }

    /// Apply persistence commands in order, pass everything through
    fn dispatch(&mut self, commands: Vec<Command>) -> Vec<Command> {
        for command in &commands {
            match command {
                Command::PersistSnapshot(snapshot) => self.slot.save(&mut self.store, snapshot),
                Command::ClearSave => self.slot.clear(&mut self.store),
                Command::GameOver { score, turns } => self.record_result(*score, *turns),
                _ => {}
            }
        }
        commands
    }

    fn record_result(&mut self, score: u64, turns: u64) {
        let entry = HighScoreEntry {
            score,
            turns,
            rows: self.engine.board().rows(),
            columns: self.engine.board().columns(),
            timestamp: now_millis(),
        };
        self.last_rank = self.high_scores.add(entry);
        if let Some(rank) = self.last_rank {
            log::info!("New best result, rank {}", rank);
            self.high_scores.save(&mut self.store);
        }
    }
}
