//! Browser bindings
//!
//! The page's script owns rendering, animation and audio. It creates a
//! `WebGame`, forwards card clicks and frame times, and plays back the JSON
//! command lists it gets in return.

use wasm_bindgen::prelude::*;

use crate::persistence::{KeyValueStore, LocalStore, MemoryStore};
use crate::session::Session;
use crate::settings::{Difficulty, Settings};
use crate::sim::Command;

/// LocalStorage when available, otherwise an in-memory fallback
enum BrowserStore {
    Local(LocalStore),
    Memory(MemoryStore),
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match self {
            BrowserStore::Local(s) => s.remove(key),
            BrowserStore::Memory(s) => s.remove(key),
        }
    }
}

fn to_json(commands: &[Command]) -> String {
    serde_json::to_string(commands).unwrap_or_else(|e| {
        log::error!("Failed to encode commands: {}", e);
        "[]".to_owned()
    })
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session<BrowserStore>,
}

#[wasm_bindgen]
impl WebGame {
    /// Resume the saved board or deal a new one from stored settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let store = match LocalStore::new() {
            Ok(store) => BrowserStore::Local(store),
            Err(e) => {
                log::warn!("{}, progress will not be kept", e);
                BrowserStore::Memory(MemoryStore::new())
            }
        };
        let seed = super::random_seed();
        let session = Session::start(store, seed).map_err(to_js_error)?;
        Ok(WebGame { session })
    }

    pub fn flip(&mut self, index: usize) -> String {
        to_json(&self.session.flip(index))
    }

    /// Advance by `dt` seconds of frame time
    pub fn tick(&mut self, dt: f32) -> String {
        to_json(&self.session.tick(dt))
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) -> Result<(), JsValue> {
        self.session.new_game().map_err(to_js_error)
    }

    /// Switch to a named preset ("easy" .. "master") and deal a new board
    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, name: &str) -> Result<(), JsValue> {
        let difficulty = Difficulty::from_str(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown difficulty: {name}")))?;
        let mut settings: Settings = self.session.settings().clone();
        settings.apply_difficulty(difficulty);
        self.session.apply_settings(settings).map_err(to_js_error)
    }

    /// Current cards as JSON, for laying out the grid
    pub fn cards(&self) -> String {
        serde_json::to_string(self.session.cards()).unwrap_or_else(|_| "[]".to_owned())
    }

    pub fn rows(&self) -> u32 {
        self.session.engine().board().rows()
    }

    pub fn columns(&self) -> u32 {
        self.session.engine().board().columns()
    }

    pub fn score(&self) -> u64 {
        self.session.engine().score()
    }

    pub fn turns(&self) -> u64 {
        self.session.engine().turns()
    }

    pub fn combo(&self) -> u32 {
        self.session.engine().combo()
    }

    #[wasm_bindgen(js_name = isRestored)]
    pub fn is_restored(&self) -> bool {
        self.session.is_restored()
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.session.engine().is_finished()
    }
}
