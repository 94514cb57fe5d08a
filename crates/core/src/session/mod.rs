//! Game session: the orchestrating state machine the view layer talks to.
//!
//! One session owns a game, the clock pair, and the settings, and accepts
//! discrete intents (select square, undo, reset, timer toggles). After
//! every accepted intent it replaces its derived snapshot wholesale and
//! decides itself whether a computer reply needs scheduling; nothing here
//! is reactive or implicit.

mod settings;

pub use settings::{Mode, Settings, SettingsUpdate};

use crate::board::{PieceKind, Side, Square};
use crate::clock::ClockPair;
use crate::error::{Error, Result};
use crate::opponent;
use crate::rules::{Game, GameState, Move};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;

/// The side the computer opponent plays.
const COMPUTER_SIDE: Side = Side::Black;

const MIN_THINK_MS: u64 = 500;
const MAX_THINK_MS: u64 = 1000;

/// What a `select_square` intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectOutcome {
    /// A piece of the side to move was (re)selected.
    Selected,
    /// The selected piece moved to the chosen square.
    Moved,
    /// The selection was cancelled.
    Cleared,
    /// Nothing was selected and the square held nothing actionable,
    /// or the game is over.
    Ignored,
}

/// Notification payload fired once per applied ply.
#[derive(Debug, Clone, Serialize)]
pub struct MoveEvent {
    pub mv: Move,
    pub is_check: bool,
    pub is_game_over: bool,
}

/// A scheduled computer reply. The driver sleeps for `delay`, then calls
/// [`GameSession::play_reply`] with `generation`; a stale generation means
/// the session moved on (reset, undo) and the reply must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    pub generation: u64,
    pub delay: Duration,
}

type MoveHook = Box<dyn FnMut(&MoveEvent) + Send>;

pub struct GameSession {
    game: Game,
    state: GameState,
    selected: Option<Square>,
    legal_targets: Vec<Square>,
    settings: Settings,
    clock: ClockPair,
    generation: u64,
    pending_reply: Option<ReplyTicket>,
    rng: StdRng,
    move_hook: Option<MoveHook>,
}

impl GameSession {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Seeded constructor for deterministic tests.
    pub fn with_rng(settings: Settings, rng: StdRng) -> Self {
        let game = Game::new();
        let state = game.state();
        let clock = ClockPair::new(settings.time_control.base, settings.time_control.increment);
        GameSession {
            game,
            state,
            selected: None,
            legal_targets: Vec::new(),
            settings,
            clock,
            generation: 0,
            pending_reply: None,
            rng,
            move_hook: None,
        }
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn legal_destinations(&self) -> &[Square] {
        &self.legal_targets
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn white_time(&self) -> u32 {
        self.clock.time(Side::White)
    }

    pub fn black_time(&self) -> u32 {
        self.clock.time(Side::Black)
    }

    pub fn timer_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Registers the per-move notification hook (audio/visual feedback).
    pub fn set_move_hook(&mut self, hook: impl FnMut(&MoveEvent) + Send + 'static) {
        self.move_hook = Some(Box::new(hook));
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Handles a square selection: pick up a piece, drop it on a legal
    /// destination, re-select another own piece, or cancel.
    pub fn select_square(&mut self, sq: Square) -> SelectOutcome {
        if self.state.is_game_over {
            return SelectOutcome::Ignored;
        }

        let own_piece = self
            .game
            .position()
            .piece_at(sq)
            .is_some_and(|p| p.side == self.state.turn);

        if own_piece {
            self.selected = Some(sq);
            self.legal_targets = self.game.legal_destinations(sq);
            return SelectOutcome::Selected;
        }

        if let Some(from) = self.selected {
            if self.legal_targets.contains(&sq) {
                // Promotion choice is not part of the click path; queen is
                // the default, as in the promotion contract.
                match self.commit_move(from, sq, None) {
                    Ok(_) => {
                        self.clear_selection();
                        return SelectOutcome::Moved;
                    }
                    Err(err) => {
                        tracing::warn!(%from, to = %sq, %err, "legal target failed to apply");
                    }
                }
            }
            self.clear_selection();
            return SelectOutcome::Cleared;
        }

        SelectOutcome::Ignored
    }

    /// Direct from/to move intent (the drag-and-drop path). Rejected
    /// without state change if illegal or the game is over.
    pub fn move_piece(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move> {
        if self.state.is_game_over {
            return Err(Error::IllegalMove { from, to });
        }
        let mv = self.commit_move(from, to, promotion)?;
        self.clear_selection();
        Ok(mv)
    }

    /// Reverts one ply, or two when playing the computer and it is the
    /// human's turn (taking back the reply as well). No time is refunded.
    /// A no-op on empty history.
    pub fn undo(&mut self) -> bool {
        self.invalidate_pending();

        // On the human's turn against the computer, take back the computer's
        // reply as well; on the computer's turn only the human move exists.
        let double = self.settings.mode == Mode::Computer && self.state.turn != COMPUTER_SIDE;
        let undone = self.game.undo().is_ok();
        if undone && double {
            // Ignore a missing second ply; one may be all there is.
            let _ = self.game.undo();
        }

        if undone {
            self.clear_selection();
            self.refresh_state();
        }
        undone
    }

    /// Discards the game, reloads the clocks, and returns to awaiting
    /// selection. Settings carry over.
    pub fn reset(&mut self) {
        self.invalidate_pending();
        self.game = Game::new();
        self.clock.reset(
            self.settings.time_control.base,
            self.settings.time_control.increment,
        );
        self.clear_selection();
        self.refresh_state();
        tracing::info!("session reset");
    }

    /// Applies a partial settings update. Changing the time control
    /// reloads both clocks.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.invalidate_pending();
        let time_control_changed = self.settings.apply(update);
        if time_control_changed {
            self.clock.reset(
                self.settings.time_control.base,
                self.settings.time_control.increment,
            );
        }
        // Switching to computer mode on the computer's turn owes a reply.
        if self.settings.mode == Mode::Computer
            && self.state.turn == COMPUTER_SIDE
            && !self.state.is_game_over
        {
            self.schedule_reply();
        }
    }

    pub fn start_timer(&mut self) {
        self.clock.start();
    }

    pub fn pause_timer(&mut self) {
        self.clock.pause();
    }

    /// One-second clock tick for the side to move. Ignored once the game
    /// is over or while paused.
    pub fn tick(&mut self) {
        if self.state.is_game_over {
            return;
        }
        self.clock.tick(self.state.turn);
    }

    // ------------------------------------------------------------------
    // Computer reply protocol
    // ------------------------------------------------------------------

    /// Takes the pending reply ticket, if one was just scheduled. The
    /// caller owns sleeping for `delay` and then calling [`play_reply`].
    ///
    /// [`play_reply`]: GameSession::play_reply
    pub fn take_reply_ticket(&mut self) -> Option<ReplyTicket> {
        self.pending_reply.take()
    }

    /// Applies the computer's move for a previously issued ticket.
    /// Returns `Ok(false)` when the ticket went stale (reset, undo, or a
    /// settings change got there first) or it is no longer the computer's
    /// turn.
    pub fn play_reply(&mut self, generation: u64) -> Result<bool> {
        if generation != self.generation
            || self.settings.mode != Mode::Computer
            || self.state.is_game_over
            || self.state.turn != COMPUTER_SIDE
        {
            return Ok(false);
        }

        let moves = self.game.legal_moves();
        // An empty move list here means game-over went undetected upstream.
        let mv = opponent::select_move(
            self.game.position(),
            &moves,
            self.settings.difficulty,
            &mut self.rng,
        )
        .ok_or(Error::NoLegalMoves)?;

        self.commit_move(mv.from, mv.to, mv.promotion)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move> {
        let mover = self.state.turn;
        let mv = self.game.make_move(from, to, promotion)?;
        self.clock.add_increment(mover);
        self.refresh_state();
        tracing::debug!(san = %mv.san, side = %mover, "move applied");

        let event = MoveEvent {
            mv: mv.clone(),
            is_check: self.state.is_check,
            is_game_over: self.state.is_game_over,
        };
        if let Some(hook) = self.move_hook.as_mut() {
            hook(&event);
        }

        if self.settings.mode == Mode::Computer
            && self.state.turn == COMPUTER_SIDE
            && !self.state.is_game_over
        {
            self.schedule_reply();
        }
        Ok(mv)
    }

    fn schedule_reply(&mut self) {
        let delay = Duration::from_millis(self.rng.random_range(MIN_THINK_MS..=MAX_THINK_MS));
        self.pending_reply = Some(ReplyTicket {
            generation: self.generation,
            delay,
        });
    }

    /// Bumps the generation so any in-flight reply ticket is dropped.
    fn invalidate_pending(&mut self) {
        self.generation += 1;
        self.pending_reply = None;
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_targets.clear();
    }

    fn refresh_state(&mut self) {
        self.state = self.game.state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    fn session(mode: Mode) -> GameSession {
        let settings = Settings {
            mode,
            ..Default::default()
        };
        GameSession::with_rng(settings, StdRng::seed_from_u64(7))
    }

    fn scholars_mate(session: &mut GameSession) {
        for (from, to) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("d1", "h5"),
            ("b8", "c6"),
            ("f1", "c4"),
            ("g8", "f6"),
            ("h5", "f7"),
        ] {
            session.move_piece(sq(from), sq(to), None).unwrap();
        }
    }

    #[test]
    fn test_select_then_move() {
        let mut s = session(Mode::Local);
        assert_eq!(s.select_square(sq("e2")), SelectOutcome::Selected);
        assert!(s.legal_destinations().contains(&sq("e4")));

        assert_eq!(s.select_square(sq("e4")), SelectOutcome::Moved);
        assert_eq!(s.selected(), None);
        assert!(s.legal_destinations().is_empty());
        assert_eq!(s.game_state().turn, Side::Black);
        assert_eq!(s.game_state().move_history.len(), 1);

        // A click on one of White's old destinations must not replay a
        // move from the now-empty e2 square
        assert_eq!(s.select_square(sq("e3")), SelectOutcome::Ignored);
        assert_eq!(s.game_state().move_history.len(), 1);
    }

    #[test]
    fn test_reselect_own_piece() {
        let mut s = session(Mode::Local);
        s.select_square(sq("e2"));
        // Clicking another own piece re-selects instead of cancelling
        assert_eq!(s.select_square(sq("g1")), SelectOutcome::Selected);
        assert_eq!(s.selected(), Some(sq("g1")));
        assert!(s.legal_destinations().contains(&sq("f3")));
    }

    #[test]
    fn test_cancel_selection() {
        let mut s = session(Mode::Local);
        s.select_square(sq("e2"));
        // e5 is neither legal nor an own piece
        assert_eq!(s.select_square(sq("e5")), SelectOutcome::Cleared);
        assert_eq!(s.selected(), None);

        // Nothing selected, nothing actionable
        assert_eq!(s.select_square(sq("e5")), SelectOutcome::Ignored);
    }

    #[test]
    fn test_move_credits_increment() {
        let mut s = session(Mode::Local);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(s.white_time(), 303);
        assert_eq!(s.black_time(), 300);
    }

    #[test]
    fn test_tick_respects_pause_and_turn() {
        let mut s = session(Mode::Local);
        s.tick();
        assert_eq!(s.white_time(), 300);

        s.start_timer();
        s.tick();
        assert_eq!(s.white_time(), 299);
        assert_eq!(s.black_time(), 300);

        s.pause_timer();
        s.tick();
        assert_eq!(s.white_time(), 299);
    }

    #[test]
    fn test_game_over_latches_intents() {
        let mut s = session(Mode::Local);
        scholars_mate(&mut s);
        assert!(s.game_state().is_game_over);

        assert_eq!(s.select_square(sq("e8")), SelectOutcome::Ignored);
        assert!(s.move_piece(sq("a7"), sq("a6"), None).is_err());
        s.start_timer();
        let black = s.black_time();
        s.tick();
        assert_eq!(s.black_time(), black);

        // Reset clears the terminal state
        s.reset();
        assert!(!s.game_state().is_game_over);
        assert_eq!(s.select_square(sq("e2")), SelectOutcome::Selected);
    }

    #[test]
    fn test_reset_reloads_clocks_and_history() {
        let mut s = session(Mode::Local);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        s.start_timer();
        s.reset();

        assert!(!s.timer_running());
        assert_eq!(s.white_time(), 300);
        assert!(s.game_state().move_history.is_empty());
        assert_eq!(s.game_state().turn, Side::White);
    }

    #[test]
    fn test_undo_single_ply_local() {
        let mut s = session(Mode::Local);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        s.move_piece(sq("e7"), sq("e5"), None).unwrap();

        assert!(s.undo());
        assert_eq!(s.game_state().move_history.len(), 1);
        assert_eq!(s.game_state().turn, Side::Black);

        // No time refund
        assert_eq!(s.white_time(), 303);
        assert_eq!(s.black_time(), 303);
    }

    #[test]
    fn test_undo_nothing_to_undo() {
        let mut s = session(Mode::Local);
        assert!(!s.undo());
    }

    #[test]
    fn test_computer_reply_round_trip() {
        let mut s = session(Mode::Computer);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();

        let ticket = s.take_reply_ticket().expect("reply scheduled");
        assert!(ticket.delay >= Duration::from_millis(500));
        assert!(ticket.delay <= Duration::from_millis(1000));
        // Ticket is handed out once
        assert!(s.take_reply_ticket().is_none());

        assert!(s.play_reply(ticket.generation).unwrap());
        assert_eq!(s.game_state().move_history.len(), 2);
        assert_eq!(s.game_state().turn, Side::White);
        // Computer's move credited Black's increment
        assert_eq!(s.black_time(), 303);
        // The computer's own move schedules nothing
        assert!(s.take_reply_ticket().is_none());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut s = session(Mode::Computer);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        let ticket = s.take_reply_ticket().unwrap();

        s.reset();
        assert!(!s.play_reply(ticket.generation).unwrap());
        assert!(s.game_state().move_history.is_empty());
    }

    #[test]
    fn test_undo_cancels_pending_reply() {
        let mut s = session(Mode::Computer);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        let ticket = s.take_reply_ticket().unwrap();

        // Human takes the move back before the computer "finishes thinking"
        assert!(s.undo());
        assert!(s.game_state().move_history.is_empty());
        assert!(!s.play_reply(ticket.generation).unwrap());
        assert!(s.game_state().move_history.is_empty());
    }

    #[test]
    fn test_undo_reverts_round_against_computer() {
        let mut s = session(Mode::Computer);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        let ticket = s.take_reply_ticket().unwrap();
        s.play_reply(ticket.generation).unwrap();
        assert_eq!(s.game_state().move_history.len(), 2);

        // Human's turn again: undo reverts both the reply and the move
        assert!(s.undo());
        assert!(s.game_state().move_history.is_empty());
        assert_eq!(s.game_state().turn, Side::White);
    }

    #[test]
    fn test_switching_to_local_drops_reply() {
        let mut s = session(Mode::Computer);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        let ticket = s.take_reply_ticket().unwrap();

        s.update_settings(SettingsUpdate {
            mode: Some(Mode::Local),
            ..Default::default()
        });
        assert!(!s.play_reply(ticket.generation).unwrap());
    }

    #[test]
    fn test_switching_to_computer_mid_game_owes_reply() {
        let mut s = session(Mode::Local);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        assert!(s.take_reply_ticket().is_none());

        s.update_settings(SettingsUpdate {
            mode: Some(Mode::Computer),
            ..Default::default()
        });
        let ticket = s.take_reply_ticket().expect("computer owes a move");
        assert!(s.play_reply(ticket.generation).unwrap());
        assert_eq!(s.game_state().turn, Side::White);
    }

    #[test]
    fn test_time_control_update_reloads_clocks() {
        let mut s = session(Mode::Local);
        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        s.update_settings(SettingsUpdate {
            time_control: Some(crate::clock::TimeControl::new("Bullet 1+0", 60, 0)),
            ..Default::default()
        });
        assert_eq!(s.white_time(), 60);
        assert_eq!(s.black_time(), 60);
        assert!(!s.timer_running());
    }

    #[test]
    fn test_move_hook_fires_per_ply() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut s = session(Mode::Local);
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        s.set_move_hook(move |event| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(!event.mv.san.is_empty());
        });

        s.move_piece(sq("e2"), sq("e4"), None).unwrap();
        s.select_square(sq("e7"));
        s.select_square(sq("e5"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hook_reports_check_and_game_over() {
        use std::sync::{Arc, Mutex};

        let mut s = session(Mode::Local);
        let events: Arc<Mutex<Vec<(bool, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        s.set_move_hook(move |event| {
            sink.lock()
                .unwrap()
                .push((event.is_check, event.is_game_over));
        });

        scholars_mate(&mut s);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(*events.last().unwrap(), (true, true));
        assert!(events[..6].iter().all(|&(_, over)| !over));
    }
}
