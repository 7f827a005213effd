//! Deterministic game core
//!
//! All rules live here. This module must stay free of rendering, audio and
//! storage concerns:
//! - Seeded RNG only (injected into board generation)
//! - Time only advances through `MatchEngine::tick`
//! - Side effects are returned as `Command`s, never performed

pub mod board;
pub mod command;
pub mod engine;
pub mod snapshot;

pub use board::{Board, Card, CardStatus, validate_dimensions};
pub use command::{Command, SoundEffect};
pub use engine::{EnginePhase, FlipRejection, MatchEngine};
pub use snapshot::Snapshot;
