//! Chess Client Core Library
//!
//! Rules engine, heuristic computer opponent, clock pair, and the game
//! session state machine. The presentation layer consumes this crate
//! through [`GameSession`]'s intents and its derived [`GameState`]
//! snapshot; nothing here renders, blocks, or talks to the network.

pub mod board;
pub mod clock;
pub mod error;
pub mod opponent;
pub mod rules;
pub mod session;

pub use board::{CastlingRights, Piece, PieceKind, Side, Square};
pub use clock::{ClockPair, TimeControl};
pub use error::{Error, Result};
pub use opponent::Difficulty;
pub use rules::{Game, GameState, LastMove, Move, MoveKind, Position};
pub use session::{GameSession, Mode, MoveEvent, ReplyTicket, SelectOutcome, Settings, SettingsUpdate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position() {
        let pos = Position::new();

        // Starting position has 32 pieces and 20 legal moves for White
        assert_eq!(pos.board.pieces().count(), 32);
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.turn, Side::White);
        assert!(!pos.in_check(Side::White));
    }

    #[test]
    fn test_game_state_serializes() {
        let state = Game::new().state();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["turn"], "white");
        assert_eq!(json["is_game_over"], false);
        assert_eq!(
            json["fen"],
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }
}
