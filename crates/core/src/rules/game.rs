//! Game wrapper: position + append-only history + derived state snapshot

use crate::board::{PieceKind, Side, Square};
use crate::error::{Error, Result};
use crate::rules::moves::Move;
use crate::rules::position::Position;
use serde::Serialize;

/// The from/to pair of the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
}

/// Derived snapshot of a game, recomputed after every ply. Treat as a
/// value: it is replaced wholesale, never patched.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub fen: String,
    pub turn: Side,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_draw: bool,
    pub is_game_over: bool,
    pub move_history: Vec<Move>,
    pub last_move: Option<LastMove>,
}

struct HistoryEntry {
    /// Position before the move, kept whole so undo is pop-and-discard.
    before: Position,
    mv: Move,
}

/// One chess game: the current position plus its move history.
pub struct Game {
    position: Position,
    history: Vec<HistoryEntry>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// Starts from the standard initial array.
    pub fn new() -> Self {
        Game {
            position: Position::new(),
            history: Vec::new(),
        }
    }

    /// Starts from an explicit FEN encoding.
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Game {
            position: Position::from_fen(fen)?,
            history: Vec::new(),
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Side {
        self.position.turn
    }

    /// Moves played so far, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|entry| &entry.mv)
    }

    /// Legal destination squares for the piece on `from`, promotion
    /// choices collapsed to one entry per destination.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut out: Vec<Square> = self
            .position
            .legal_moves_from(from)
            .iter()
            .map(|mv| mv.to)
            .collect();
        out.dedup();
        out
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    /// Validates and applies a move, appending it to the history.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move> {
        let (next, mv) = self.position.apply(from, to, promotion)?;
        let before = std::mem::replace(&mut self.position, next);
        self.history.push(HistoryEntry {
            before,
            mv: mv.clone(),
        });
        Ok(mv)
    }

    /// Reverts the most recent ply, restoring the prior position.
    pub fn undo(&mut self) -> Result<Move> {
        let entry = self.history.pop().ok_or(Error::EmptyHistory)?;
        self.position = entry.before;
        Ok(entry.mv)
    }

    /// Recomputes the full derived snapshot for the current position.
    pub fn state(&self) -> GameState {
        let position = &self.position;
        let is_check = position.in_check(position.turn);
        let has_moves = position.has_legal_move();
        let is_checkmate = is_check && !has_moves;
        let is_stalemate = !is_check && !has_moves;
        let is_draw = is_stalemate || insufficient_material(position);

        GameState {
            fen: position.to_fen(),
            turn: position.turn,
            is_check,
            is_checkmate,
            is_stalemate,
            is_draw,
            is_game_over: is_checkmate || is_draw,
            move_history: self.moves().cloned().collect(),
            last_move: self.history.last().map(|entry| LastMove {
                from: entry.mv.from,
                to: entry.mv.to,
            }),
        }
    }
}

/// Neither side can force mate: bare kings, or a lone minor piece.
/// Repetition and fifty-move draws are intentionally not detected.
fn insufficient_material(position: &Position) -> bool {
    let mut extras = position
        .board
        .pieces()
        .filter(|(_, p)| p.kind != PieceKind::King);

    match extras.next() {
        None => true,
        Some((_, piece)) => {
            matches!(piece.kind, PieceKind::Bishop | PieceKind::Knight) && extras.next().is_none()
        }
    }
}
