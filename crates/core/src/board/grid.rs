//! The 8x8 piece array and the FEN piece-placement codec

use super::types::{Piece, PieceKind, Side, Square};
use crate::error::{Error, Result};

/// Fixed-size array-backed board: square index -> piece or empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Board([Option<Piece>; 64]);

impl Board {
    pub fn empty() -> Self {
        Board([None; 64])
    }

    /// The standard starting array.
    pub fn standard() -> Self {
        Board::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .expect("standard placement is valid")
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.0[sq.index()]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.0[sq.index()] = piece;
    }

    /// Occupied squares with their pieces, a1 through h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Occupied squares belonging to one side.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.side == side)
    }

    /// The square holding `side`'s king, if present.
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces_of(side)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Parses the first FEN field (piece placement, ranks 8 down to 1).
    ///
    /// Piece counts are not policed beyond requiring exactly one king per
    /// side; a side without a king has no position to defend.
    pub fn from_placement(placement: &str) -> Result<Board> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(Error::InvalidEncoding(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file: u8 = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(Error::InvalidEncoding(format!(
                            "bad skip count '{c}' in rank {}",
                            rank + 1
                        )));
                    }
                    if file + skip as u8 > 8 {
                        return Err(Error::InvalidEncoding(format!(
                            "rank {} overflows 8 files",
                            rank + 1
                        )));
                    }
                    file += skip as u8;
                } else {
                    let (kind, side) = PieceKind::from_fen_char(c).ok_or_else(|| {
                        Error::InvalidEncoding(format!("unknown piece character '{c}'"))
                    })?;
                    if file >= 8 {
                        return Err(Error::InvalidEncoding(format!(
                            "rank {} overflows 8 files",
                            rank + 1
                        )));
                    }
                    board.set(Square::from_coords(file, rank), Some(Piece::new(kind, side)));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(Error::InvalidEncoding(format!(
                    "rank {} describes {file} files, expected 8",
                    rank + 1
                )));
            }
        }

        for side in [Side::White, Side::Black] {
            let kings = board
                .pieces_of(side)
                .filter(|(_, p)| p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(Error::InvalidEncoding(format!(
                    "{side} has {kings} kings, expected 1"
                )));
            }
        }

        Ok(board)
    }

    /// Renders the FEN piece-placement field.
    pub fn to_placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from_digit(empty, 10).expect("empty run <= 8"));
                            empty = 0;
                        }
                        out.push(piece.kind.fen_char(piece.side));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from_digit(empty, 10).expect("empty run <= 8"));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board({})", self.to_placement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board() {
        let board = Board::standard();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.pieces_of(Side::White).count(), 16);
        assert_eq!(board.king_square(Side::White), Square::from_name("e1"));
        assert_eq!(board.king_square(Side::Black), Square::from_name("e8"));

        let e2 = board.piece_at(Square::from_name("e2").unwrap()).unwrap();
        assert_eq!(e2, Piece::new(PieceKind::Pawn, Side::White));
    }

    #[test]
    fn test_placement_round_trip() {
        let placement = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
        let board = Board::from_placement(placement).unwrap();
        assert_eq!(board.to_placement(), placement);

        let sparse = "8/8/8/3k4/8/4K3/8/8";
        let board = Board::from_placement(sparse).unwrap();
        assert_eq!(board.to_placement(), sparse);
    }

    #[test]
    fn test_placement_rejects_malformed() {
        // Too few ranks
        assert!(Board::from_placement("8/8/8/8").is_err());
        // Unknown piece letter
        assert!(Board::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX").is_err());
        // Rank too long
        assert!(Board::from_placement("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
        // Rank too short
        assert!(Board::from_placement("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
        // Skip digits alone run past eight files
        assert!(Board::from_placement("rnbqkbnr/pppppppp/8/45/8/8/PPPPPPPP/RNBQKBNR").is_err());
    }

    #[test]
    fn test_placement_rejects_long_digit_run() {
        // An arbitrarily long run of skip digits must error, not wrap
        let rank = "8".repeat(40);
        let placement = format!("{rank}/8/8/8/8/8/8/8");
        assert!(Board::from_placement(&placement).is_err());
    }

    #[test]
    fn test_placement_requires_both_kings() {
        // Black king missing
        assert!(Board::from_placement("8/8/8/8/8/4K3/8/8").is_err());
        // Two white kings
        assert!(Board::from_placement("4k3/8/8/8/8/4K3/4K3/8").is_err());
        // Odd piece counts are tolerated (three white queens)
        assert!(Board::from_placement("4k3/8/8/QQQ5/8/4K3/8/8").is_ok());
    }
}
