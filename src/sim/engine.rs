//! Match engine
//!
//! Owns the authoritative board and scoring state. Player clicks come in
//! through [`MatchEngine::flip`]; elapsed time comes in through
//! [`MatchEngine::tick`]. Every mutation is reported back as a list of
//! [`Command`]s for the presentation layer and host to apply in order.

use std::collections::VecDeque;

use super::board::{Board, Card, CardStatus};
use super::command::{Command, SoundEffect};
use super::snapshot::Snapshot;
use crate::error::SnapshotError;

/// Whether the board still accepts flips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Playing,
    /// Every pair has been found
    Finished,
}

/// Why a flip request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipRejection {
    OutOfRange,
    AlreadyFaceUp,
    AlreadyMatched,
    Finished,
}

#[derive(Debug, Clone)]
pub struct MatchEngine {
    board: Board,
    score: u64,
    turns: u64,
    combo: u32,
    /// Face-up cards waiting to be compared, oldest first
    pending: VecDeque<usize>,
    /// A pair is inside its reveal window
    resolving: bool,
    /// Seconds left before the in-flight pair is compared
    reveal_timer: f32,
    reveal_delay: f32,
    phase: EnginePhase,
}

impl MatchEngine {
    /// Start a fresh game on `board`
    ///
    /// `reveal_delay` is how long both cards of a pair stay visible before the
    /// result is applied. Zero resolves pairs inside `flip`.
    pub fn new(board: Board, reveal_delay: f32) -> Self {
        Self {
            board,
            score: 0,
            turns: 0,
            combo: 0,
            pending: VecDeque::new(),
            resolving: false,
            reveal_timer: 0.0,
            reveal_delay: reveal_delay.max(0.0),
            phase: EnginePhase::Playing,
        }
    }

    /// Resume from a saved snapshot
    pub fn restore(snapshot: &Snapshot, reveal_delay: f32) -> Result<Self, SnapshotError> {
        let board = snapshot.to_board()?;
        let mut engine = Self::new(board, reveal_delay);
        engine.score = snapshot.score;
        engine.turns = snapshot.turns;
        engine.combo = snapshot.combo;
        Ok(engine)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cards(&self) -> &[Card] {
        self.board.cards()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Seconds until the in-flight pair is compared (zero when idle)
    pub fn reveal_remaining(&self) -> f32 {
        if self.resolving { self.reveal_timer } else { 0.0 }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EnginePhase::Finished
    }

    /// Check whether `index` would accept a flip right now
    pub fn check_flip(&self, index: usize) -> Result<(), FlipRejection> {
        if self.is_finished() {
            return Err(FlipRejection::Finished);
        }
        match self.board.get(index).map(|c| c.status) {
            None => Err(FlipRejection::OutOfRange),
            Some(CardStatus::FaceUp) => Err(FlipRejection::AlreadyFaceUp),
            Some(CardStatus::Matched) => Err(FlipRejection::AlreadyMatched),
            Some(CardStatus::FaceDown) => Ok(()),
        }
    }

    pub fn can_flip(&self, index: usize) -> bool {
        self.check_flip(index).is_ok()
    }

    /// Turn a card face up
    ///
    /// Invalid targets (out of range, already showing, already matched) are
    /// ignored and produce no commands. Once two or more cards are waiting and
    /// no pair is in its reveal window, the oldest two start resolving.
    pub fn flip(&mut self, index: usize) -> Vec<Command> {
        let mut commands = Vec::new();

        if let Err(reason) = self.check_flip(index) {
            log::trace!("Ignored flip of card {}: {:?}", index, reason);
            return commands;
        }

        self.board.set_status(index, CardStatus::FaceUp);
        commands.push(Command::Flip(index));
        self.pending.push_back(index);
        commands.push(Command::PlaySound(SoundEffect::Flip));

        self.pump(&mut commands);
        commands
    }

    /// Advance the reveal window by `dt` seconds
    ///
    /// Completes the in-flight pair when its window runs out, then carries any
    /// leftover time into the next queued pair.
    pub fn tick(&mut self, dt: f32) -> Vec<Command> {
        let mut commands = Vec::new();
        let mut remaining = dt.max(0.0);

        while self.resolving {
            if self.reveal_timer > remaining {
                self.reveal_timer -= remaining;
                break;
            }
            remaining -= self.reveal_timer;
            self.reveal_timer = 0.0;
            self.settle(&mut commands);
            self.pump(&mut commands);
        }

        commands
    }

    /// Skip the rest of the current reveal window
    pub fn finish_reveal(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.resolving {
            self.reveal_timer = 0.0;
            self.settle(&mut commands);
            self.pump(&mut commands);
        }
        commands
    }

    /// Project the current state for saving
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.board.rows(),
            columns: self.board.columns(),
            score: self.score,
            turns: self.turns,
            combo: self.combo,
            card_values: self.board.values().collect(),
            matched: self.board.matched_flags().collect(),
        }
    }

    /// Start resolving queued pairs until one has to wait out its window
    fn pump(&mut self, commands: &mut Vec<Command>) {
        while !self.resolving && self.pending.len() >= 2 {
            self.begin_reveal(commands);
            if self.reveal_timer > 0.0 {
                break;
            }
            self.settle(commands);
        }
    }

    fn begin_reveal(&mut self, commands: &mut Vec<Command>) {
        self.resolving = true;
        self.turns = self.turns.saturating_add(1);
        self.reveal_timer = self.reveal_delay;
        commands.push(Command::RevealDelay {
            first: self.pending[0],
            second: self.pending[1],
            seconds: self.reveal_delay,
        });
    }

    /// Compare the oldest pair and apply the outcome
    fn settle(&mut self, commands: &mut Vec<Command>) {
        let (Some(first), Some(second)) = (self.pending.pop_front(), self.pending.pop_front())
        else {
            self.resolving = false;
            return;
        };
        let first_value = self.board.cards()[first].value;
        let second_value = self.board.cards()[second].value;

        if first_value == second_value {
            self.combo = self.combo.saturating_add(1);
            self.score = self.score.saturating_add(u64::from(self.combo));
            self.board.set_status(first, CardStatus::Matched);
            self.board.set_status(second, CardStatus::Matched);
            commands.push(Command::MarkMatched(first));
            commands.push(Command::MarkMatched(second));
            commands.push(Command::PlaySound(SoundEffect::Match));
            if self.combo > 1 {
                commands.push(Command::ShowCombo(self.combo));
            }
            log::debug!(
                "Matched {} and {} (combo {}, score {})",
                first,
                second,
                self.combo,
                self.score
            );
        } else {
            self.combo = 0;
            self.board.set_status(first, CardStatus::FaceDown);
            self.board.set_status(second, CardStatus::FaceDown);
            commands.push(Command::Unflip(first));
            commands.push(Command::Unflip(second));
            commands.push(Command::PlaySound(SoundEffect::Mismatch));
            commands.push(Command::PunchFeedback(first));
            commands.push(Command::PunchFeedback(second));
            log::debug!("Mismatched {} and {}", first, second);
        }

        commands.push(Command::PersistSnapshot(self.snapshot()));

        if self.board.all_matched() && !self.is_finished() {
            self.phase = EnginePhase::Finished;
            commands.push(Command::PlaySound(SoundEffect::GameOver));
            commands.push(Command::GameOver {
                score: self.score,
                turns: self.turns,
            });
            commands.push(Command::ClearSave);
            log::info!("Board cleared: score {} in {} turns", self.score, self.turns);
        }

        self.resolving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REVEAL_DELAY;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// 2x2 board laid out [0, 0, 1, 1]
    fn identity_board() -> Board {
        Board::from_values(2, 2, vec![0, 0, 1, 1]).unwrap()
    }

    fn instant(values: Vec<u32>, columns: u32) -> MatchEngine {
        let rows = values.len() as u32 / columns;
        MatchEngine::new(Board::from_values(rows, columns, values).unwrap(), 0.0)
    }

    fn count(commands: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_flip_emits_flip_and_sound() {
        let mut engine = MatchEngine::new(identity_board(), 0.0);

        let commands = engine.flip(0);

        assert_eq!(
            commands,
            vec![Command::Flip(0), Command::PlaySound(SoundEffect::Flip)]
        );
        assert_eq!(engine.pending().collect::<Vec<_>>(), vec![0]);
        assert_eq!(engine.cards()[0].status, CardStatus::FaceUp);
        assert_eq!(engine.turns(), 0);
    }

    #[test]
    fn test_invalid_flips_are_ignored() {
        let mut engine = MatchEngine::new(identity_board(), REVEAL_DELAY);

        assert!(engine.flip(4).is_empty());
        assert!(engine.flip(usize::MAX).is_empty());

        engine.flip(0);
        assert!(engine.flip(0).is_empty());
        assert_eq!(engine.pending_len(), 1);
        assert_eq!(engine.check_flip(0), Err(FlipRejection::AlreadyFaceUp));
        assert_eq!(engine.check_flip(9), Err(FlipRejection::OutOfRange));
    }

    #[test]
    fn test_identity_board_scenario() {
        let mut engine = MatchEngine::new(identity_board(), 0.0);

        engine.flip(0);
        let commands = engine.flip(1);
        assert!(commands.contains(&Command::MarkMatched(0)));
        assert!(commands.contains(&Command::MarkMatched(1)));
        assert!(commands.contains(&Command::PlaySound(SoundEffect::Match)));
        assert_eq!(count(&commands, |c| matches!(c, Command::ShowCombo(_))), 0);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.combo(), 1);
        assert_eq!(engine.turns(), 1);
        assert!(!engine.is_finished());

        engine.flip(2);
        let commands = engine.flip(3);
        assert!(commands.contains(&Command::ShowCombo(2)));
        assert_eq!(engine.score(), 3);
        assert_eq!(engine.combo(), 2);

        let tail: Vec<_> = commands
            .iter()
            .skip_while(|c| !matches!(c, Command::PersistSnapshot(_)))
            .skip(1)
            .cloned()
            .collect();
        assert_eq!(
            tail,
            vec![
                Command::PlaySound(SoundEffect::GameOver),
                Command::GameOver { score: 3, turns: 2 },
                Command::ClearSave,
            ]
        );
        assert!(engine.is_finished());
        assert!(engine.flip(0).is_empty());
    }

    #[test]
    fn test_match_command_order() {
        let mut engine = instant(vec![0, 0, 1, 1], 2);
        engine.flip(0);
        let commands = engine.flip(1);

        assert_eq!(commands[0], Command::Flip(1));
        assert_eq!(commands[1], Command::PlaySound(SoundEffect::Flip));
        assert_eq!(
            commands[2],
            Command::RevealDelay {
                first: 0,
                second: 1,
                seconds: 0.0
            }
        );
        assert_eq!(commands[3], Command::MarkMatched(0));
        assert_eq!(commands[4], Command::MarkMatched(1));
        assert_eq!(commands[5], Command::PlaySound(SoundEffect::Match));
        assert!(matches!(commands[6], Command::PersistSnapshot(_)));
        assert_eq!(commands.len(), 7);
    }

    #[test]
    fn test_mismatch_resets_combo_and_keeps_score() {
        let mut engine = instant(vec![0, 0, 1, 2, 1, 2], 3);
        engine.flip(0);
        engine.flip(1);
        assert_eq!((engine.score(), engine.combo()), (1, 1));

        engine.flip(2);
        let commands = engine.flip(3);

        assert_eq!(engine.score(), 1);
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.turns(), 2);
        assert_eq!(engine.cards()[2].status, CardStatus::FaceDown);
        assert_eq!(engine.cards()[3].status, CardStatus::FaceDown);
        let expected = [
            Command::Unflip(2),
            Command::Unflip(3),
            Command::PlaySound(SoundEffect::Mismatch),
            Command::PunchFeedback(2),
            Command::PunchFeedback(3),
        ];
        assert!(commands.windows(5).any(|w| w == expected));
    }

    #[test]
    fn test_combo_streak_scores_progressively() {
        let mut engine = instant(vec![0, 0, 1, 1, 2, 2, 3, 3], 4);
        let mut scores = Vec::new();
        for pair in [(0, 1), (2, 3), (4, 5)] {
            engine.flip(pair.0);
            engine.flip(pair.1);
            scores.push(engine.score());
        }
        assert_eq!(scores, vec![1, 3, 6]);
        assert_eq!(engine.combo(), 3);
    }

    #[test]
    fn test_flips_queue_during_reveal_window() {
        let mut engine = MatchEngine::new(
            Board::from_values(2, 4, vec![0, 1, 0, 1, 2, 2, 3, 3]).unwrap(),
            REVEAL_DELAY,
        );

        engine.flip(0);
        let commands = engine.flip(1);
        assert!(engine.is_resolving());
        assert_eq!(engine.turns(), 1);
        assert!(matches!(
            commands.last(),
            Some(Command::RevealDelay { first: 0, second: 1, .. })
        ));

        // Flipping during the window queues without starting another resolution
        assert_eq!(engine.flip(4).len(), 2);
        assert_eq!(engine.flip(5).len(), 2);
        assert_eq!(engine.pending().collect::<Vec<_>>(), vec![0, 1, 4, 5]);
        assert_eq!(engine.turns(), 1);

        // Window ends: (0,1) mismatch, then (4,5) starts its own window
        let commands = engine.tick(REVEAL_DELAY);
        assert!(commands.contains(&Command::Unflip(0)));
        assert!(matches!(
            commands.last(),
            Some(Command::RevealDelay { first: 4, second: 5, .. })
        ));
        assert_eq!(engine.turns(), 2);
        assert_eq!(engine.pending().collect::<Vec<_>>(), vec![4, 5]);

        let commands = engine.tick(REVEAL_DELAY / 2.0);
        assert!(commands.is_empty());
        let commands = engine.tick(REVEAL_DELAY);
        assert!(commands.contains(&Command::MarkMatched(4)));
        assert_eq!(engine.pending_len(), 0);
        assert!(!engine.is_resolving());
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn test_four_pending_resolve_in_fifo_order() {
        let mut engine = MatchEngine::new(
            Board::from_values(2, 2, vec![0, 1, 1, 0]).unwrap(),
            REVEAL_DELAY,
        );
        for index in [0, 2, 1, 3] {
            engine.flip(index);
        }
        assert_eq!(engine.pending().collect::<Vec<_>>(), vec![0, 2, 1, 3]);

        // One large step carries over into the queued pair
        let commands = engine.tick(REVEAL_DELAY * 3.0);
        let reveals: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                Command::Unflip(i) | Command::MarkMatched(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(reveals, vec![0, 2, 1, 3]);
        assert_eq!(engine.turns(), 2);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.pending_len(), 0);
    }

    #[test]
    fn test_finish_reveal_completes_current_pair_only() {
        let mut engine = MatchEngine::new(
            Board::from_values(2, 2, vec![0, 0, 1, 1]).unwrap(),
            REVEAL_DELAY,
        );
        for index in [0, 1, 2, 3] {
            engine.flip(index);
        }

        let commands = engine.finish_reveal();
        assert!(commands.contains(&Command::MarkMatched(1)));
        assert!(engine.is_resolving());
        assert_eq!(engine.turns(), 2);

        let commands = engine.finish_reveal();
        assert!(commands.contains(&Command::GameOver { score: 3, turns: 2 }));
        assert!(engine.finish_reveal().is_empty());
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut engine = instant(vec![0, 0, 1, 1], 2);
        let mut all = Vec::new();
        for index in [0, 1, 2, 3, 0, 1, 2, 3] {
            all.extend(engine.flip(index));
        }
        all.extend(engine.tick(10.0));
        assert_eq!(count(&all, |c| matches!(c, Command::GameOver { .. })), 1);
        assert_eq!(count(&all, |c| *c == Command::ClearSave), 1);
    }

    #[test]
    fn test_persist_snapshot_reflects_resolution() {
        let mut engine = instant(vec![0, 0, 1, 1], 2);
        engine.flip(0);
        let commands = engine.flip(1);
        let snapshot = commands
            .iter()
            .find_map(|c| match c {
                Command::PersistSnapshot(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.turns, 1);
        assert_eq!(snapshot.combo, 1);
        assert_eq!(snapshot.matched, vec![true, true, false, false]);
        assert_eq!(snapshot.card_values, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_restore_resumes_scoring() {
        let snapshot = Snapshot {
            rows: 2,
            columns: 3,
            score: 4,
            turns: 5,
            combo: 2,
            card_values: vec![0, 1, 2, 0, 1, 2],
            matched: vec![true, true, false, true, true, false],
        };
        let mut engine = MatchEngine::restore(&snapshot, 0.0).unwrap();
        assert!(engine.flip(0).is_empty());

        engine.flip(2);
        let commands = engine.flip(5);
        assert!(commands.contains(&Command::ShowCombo(3)));
        assert!(commands.contains(&Command::GameOver { score: 7, turns: 6 }));
    }

    #[test]
    fn test_restored_totals_saturate() {
        let snapshot = Snapshot {
            rows: 2,
            columns: 2,
            score: u64::MAX,
            turns: u64::MAX,
            combo: 0,
            card_values: vec![0, 0, 1, 1],
            matched: vec![false; 4],
        };
        let mut engine = MatchEngine::restore(&snapshot, 0.0).unwrap();

        engine.flip(0);
        engine.flip(1);

        assert_eq!(engine.score(), u64::MAX);
        assert_eq!(engine.turns(), u64::MAX);
        assert_eq!(engine.combo(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Flip(usize),
        Tick(f32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0usize..14).prop_map(Op::Flip),
            1 => (0.0f32..1.0).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_engine_invariants_hold(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..80)) {
            let board = Board::generate(3, 4, &mut Pcg32::seed_from_u64(seed)).unwrap();
            let mut engine = MatchEngine::new(board, REVEAL_DELAY);
            let mut resolutions = 0u64;
            let mut game_overs = 0;

            for op in ops {
                let before = (engine.score(), engine.combo());
                let commands = match op {
                    Op::Flip(i) => engine.flip(i),
                    Op::Tick(dt) => engine.tick(dt),
                };
                let settled = count(&commands, |c| matches!(c, Command::PersistSnapshot(_)));
                resolutions += count(&commands, |c| matches!(c, Command::RevealDelay { .. })) as u64;
                game_overs += count(&commands, |c| matches!(c, Command::GameOver { .. }));

                if settled == 1 && commands.contains(&Command::PlaySound(SoundEffect::Mismatch)) {
                    prop_assert_eq!(engine.score(), before.0);
                    prop_assert_eq!(engine.combo(), 0);
                }
                if settled == 1 && commands.contains(&Command::PlaySound(SoundEffect::Match)) {
                    prop_assert_eq!(engine.combo(), before.1 + 1);
                    prop_assert_eq!(engine.score(), before.0 + u64::from(engine.combo()));
                }

                // Every face-up card is queued exactly once
                let pending: Vec<_> = engine.pending().collect();
                let face_up: Vec<_> = engine
                    .cards()
                    .iter()
                    .filter(|c| c.status == CardStatus::FaceUp)
                    .map(|c| c.index)
                    .collect();
                let mut sorted = pending.clone();
                sorted.sort_unstable();
                prop_assert_eq!(sorted, face_up);
                prop_assert_eq!(engine.turns(), resolutions);
                prop_assert!(engine.is_resolving() || pending.len() < 2);
                prop_assert_eq!(engine.board().matched_count() % 2, 0);
            }

            prop_assert!(game_overs <= 1);
            prop_assert_eq!(game_overs == 1, engine.board().all_matched());
        }
    }
}
