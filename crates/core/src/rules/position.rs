//! Immutable-per-ply position: board, side to move, and move bookkeeping.
//!
//! A `Position` is a value. Applying a move produces a fresh `Position`,
//! leaving the old one untouched, so undo is "pop and discard" and
//! positions compare by full equality.

use crate::board::{Board, CastlingRights, Piece, PieceKind, Side, Square};
use crate::error::{Error, Result};
use crate::rules::moves::{Move, MoveKind, RawMove};
use crate::rules::san;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub turn: Side,
    pub castling: CastlingRights,
    /// Capture square for en passant, set only for the one ply after a
    /// double pawn push.
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Starts at 1, incremented after each Black move.
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            board: Board::standard(),
            turn: Side::White,
            castling: CastlingRights::full(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        Position::default()
    }

    /// Parses a full six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Position> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(Error::InvalidEncoding(format!(
                "expected 6 FEN fields, found {}",
                fields.len()
            )));
        }

        let board = Board::from_placement(fields[0])?;

        let turn = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            other => {
                return Err(Error::InvalidEncoding(format!(
                    "bad side-to-move field '{other}'"
                )))
            }
        };

        let castling = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            Error::InvalidEncoding(format!("bad castling field '{}'", fields[2]))
        })?;

        let en_passant = match fields[3] {
            "-" => None,
            name => Some(Square::from_name(name).ok_or_else(|| {
                Error::InvalidEncoding(format!("bad en-passant field '{name}'"))
            })?),
        };

        let halfmove_clock = fields[4]
            .parse()
            .map_err(|_| Error::InvalidEncoding(format!("bad halfmove clock '{}'", fields[4])))?;
        let fullmove_number = fields[5]
            .parse()
            .map_err(|_| Error::InvalidEncoding(format!("bad fullmove number '{}'", fields[5])))?;

        Ok(Position {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.board.to_placement(),
            match self.turn {
                Side::White => "w",
                Side::Black => "b",
            },
            self.castling.to_fen(),
            self.en_passant
                .map(|sq| sq.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Legal moves for the piece on `from`, with SAN attached. Empty if the
    /// square is empty or holds the opponent's piece.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.legal_raw_from(from)
            .iter()
            .map(|raw| self.build_move(raw))
            .collect()
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.legal_raw()
            .iter()
            .map(|raw| self.build_move(raw))
            .collect()
    }

    /// Applies a move previously returned by [`legal_moves`]. The move must
    /// belong to this position.
    pub fn play_move(&self, mv: &Move) -> Position {
        self.play_raw(&RawMove {
            from: mv.from,
            to: mv.to,
            kind: mv.kind,
            promotion: mv.promotion,
        })
    }

    /// Validates `from`/`to` against the legal-move set and applies.
    /// `promotion` selects the piece on a promoting move, defaulting to a
    /// queen when omitted.
    pub fn apply(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<(Position, Move)> {
        let choice = promotion.unwrap_or(PieceKind::Queen);
        let raw = self
            .legal_raw_from(from)
            .into_iter()
            .filter(|raw| raw.to == to)
            .find(|raw| raw.promotion.is_none() || raw.promotion == Some(choice))
            .ok_or(Error::IllegalMove { from, to })?;
        let mv = self.build_move(&raw);
        Ok((self.play_raw(&raw), mv))
    }

    /// Attaches capture info and SAN to a generated raw move.
    pub(crate) fn build_move(&self, raw: &RawMove) -> Move {
        let piece = self
            .piece_at(raw.from)
            .map(|p| p.kind)
            .unwrap_or(PieceKind::Pawn);
        let captured = match raw.kind {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            MoveKind::CastleKingside | MoveKind::CastleQueenside => None,
            _ => self.piece_at(raw.to).map(|p| p.kind),
        };
        Move {
            from: raw.from,
            to: raw.to,
            piece,
            captured,
            promotion: raw.promotion,
            kind: raw.kind,
            san: san::render(self, raw),
        }
    }

    /// Applies a known-legal raw move with full bookkeeping.
    pub(crate) fn play_raw(&self, raw: &RawMove) -> Position {
        let mut next = self.clone();
        let mover = self.turn;
        let piece = self
            .piece_at(raw.from)
            .expect("raw move originates from an occupied square");

        let is_capture = match raw.kind {
            MoveKind::EnPassant => true,
            MoveKind::CastleKingside | MoveKind::CastleQueenside => false,
            _ => self.piece_at(raw.to).is_some(),
        };

        // Move the piece, promoting if requested.
        next.board.set(raw.from, None);
        let landed = match raw.promotion {
            Some(kind) => Piece::new(kind, mover),
            None => piece,
        };
        next.board.set(raw.to, Some(landed));

        match raw.kind {
            MoveKind::EnPassant => {
                // The captured pawn sits beside the destination, on the
                // mover's departure rank.
                let victim = Square::from_coords(raw.to.file(), raw.from.rank());
                next.board.set(victim, None);
            }
            MoveKind::CastleKingside => {
                let rank = mover.back_rank();
                next.board.set(Square::from_coords(7, rank), None);
                next.board.set(
                    Square::from_coords(5, rank),
                    Some(Piece::new(PieceKind::Rook, mover)),
                );
            }
            MoveKind::CastleQueenside => {
                let rank = mover.back_rank();
                next.board.set(Square::from_coords(0, rank), None);
                next.board.set(
                    Square::from_coords(3, rank),
                    Some(Piece::new(PieceKind::Rook, mover)),
                );
            }
            _ => {}
        }

        // Castling rights: lost once the king or the relevant rook moves,
        // or a rook is captured on its home corner.
        if piece.kind == PieceKind::King {
            next.castling.clear_side(mover);
        }
        for (side, rank) in [(Side::White, 0), (Side::Black, 7)] {
            let a_corner = Square::from_coords(0, rank);
            let h_corner = Square::from_coords(7, rank);
            if raw.from == h_corner || raw.to == h_corner {
                next.castling.clear_kingside(side);
            }
            if raw.from == a_corner || raw.to == a_corner {
                next.castling.clear_queenside(side);
            }
        }

        next.en_passant = if raw.kind == MoveKind::DoublePush {
            raw.from.offset(0, mover.pawn_direction())
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn || is_capture {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if mover == Side::Black {
            next.fullmove_number += 1;
        }
        next.turn = mover.opponent();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_fen_round_trip() {
        let pos = Position::new();
        assert_eq!(pos.to_fen(), START_FEN);
        assert_eq!(Position::from_fen(START_FEN).unwrap(), pos);

        let mid = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
        let pos = Position::from_fen(mid).unwrap();
        assert_eq!(pos.to_fen(), mid);
        assert_eq!(pos.fullmove_number, 4);
        assert_eq!(pos.halfmove_clock, 4);
    }

    #[test]
    fn test_fen_rejects_malformed() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XX - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1").is_err());
        // Missing black king
        assert!(Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn test_apply_basic_move() {
        let pos = Position::new();
        let (next, mv) = pos.apply(sq("e2"), sq("e4"), None).unwrap();

        assert_eq!(mv.san, "e4");
        assert_eq!(mv.kind, MoveKind::DoublePush);
        assert_eq!(next.turn, Side::Black);
        assert_eq!(next.en_passant, Some(sq("e3")));
        assert_eq!(next.halfmove_clock, 0);
        assert_eq!(next.fullmove_number, 1);
        assert!(next.piece_at(sq("e2")).is_none());
        assert_eq!(
            next.piece_at(sq("e4")),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
        // Original position untouched
        assert_eq!(pos, Position::new());
    }

    #[test]
    fn test_apply_rejects_illegal() {
        let pos = Position::new();
        assert!(matches!(
            pos.apply(sq("e2"), sq("e5"), None),
            Err(Error::IllegalMove { .. })
        ));
        // Opponent piece
        assert!(pos.apply(sq("e7"), sq("e5"), None).is_err());
        // Empty square
        assert!(pos.apply(sq("e4"), sq("e5"), None).is_err());
    }

    #[test]
    fn test_counters_advance() {
        let pos = Position::new();
        let (pos, _) = pos.apply(sq("g1"), sq("f3"), None).unwrap();
        assert_eq!(pos.halfmove_clock, 1);
        assert_eq!(pos.fullmove_number, 1);
        let (pos, _) = pos.apply(sq("g8"), sq("f6"), None).unwrap();
        assert_eq!(pos.halfmove_clock, 2);
        assert_eq!(pos.fullmove_number, 2);
        // Pawn move resets the halfmove clock
        let (pos, _) = pos.apply(sq("d2"), sq("d4"), None).unwrap();
        assert_eq!(pos.halfmove_clock, 0);
    }

    #[test]
    fn test_rook_move_loses_castling_right() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let (next, _) = pos.apply(sq("h1"), sq("h2"), None).unwrap();
        assert!(!next.castling.white_kingside);
        assert!(next.castling.white_queenside);

        let (next, _) = pos.apply(sq("e1"), sq("e2"), None).unwrap();
        assert!(!next.castling.white_kingside);
        assert!(!next.castling.white_queenside);
        assert!(next.castling.black_kingside);
    }

    #[test]
    fn test_rook_capture_loses_castling_right() {
        let fen = "r3k2r/8/8/8/8/6n1/8/R3K2R b KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let (next, mv) = pos.apply(sq("g3"), sq("h1"), None).unwrap();
        assert_eq!(mv.captured, Some(PieceKind::Rook));
        assert!(!next.castling.white_kingside);
        assert!(next.castling.white_queenside);
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        let pos = Position::from_fen(fen).unwrap();

        let (next, mv) = pos.apply(sq("a7"), sq("a8"), None).unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        assert_eq!(mv.san, "a8=Q+");
        assert_eq!(
            next.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Queen, Side::White))
        );

        let (next, mv) = pos.apply(sq("a7"), sq("a8"), Some(PieceKind::Knight)).unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
        assert_eq!(
            next.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Knight, Side::White))
        );
    }

    #[test]
    fn test_en_passant_capture_removes_pawn() {
        // After 1. e4 ... 2. e5 d5, exd6 is available
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let pos = Position::from_fen(fen).unwrap();
        let (next, mv) = pos.apply(sq("e5"), sq("d6"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::EnPassant);
        assert_eq!(mv.captured, Some(PieceKind::Pawn));
        assert!(next.piece_at(sq("d5")).is_none());
        assert_eq!(
            next.piece_at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
    }

    #[test]
    fn test_castling_moves_rook() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();

        let (next, mv) = pos.apply(sq("e1"), sq("g1"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::CastleKingside);
        assert_eq!(mv.san, "O-O");
        assert_eq!(
            next.piece_at(sq("f1")),
            Some(Piece::new(PieceKind::Rook, Side::White))
        );
        assert!(next.piece_at(sq("h1")).is_none());
        assert!(!next.castling.white_kingside);
        assert!(!next.castling.white_queenside);

        let (next, mv) = pos.apply(sq("e1"), sq("c1"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::CastleQueenside);
        assert_eq!(mv.san, "O-O-O");
        assert_eq!(
            next.piece_at(sq("d1")),
            Some(Piece::new(PieceKind::Rook, Side::White))
        );
        assert!(next.piece_at(sq("a1")).is_none());
    }
}
