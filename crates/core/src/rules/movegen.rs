//! Pseudo-legal move generation and the apply-and-test legality filter.
//!
//! Legality is decided by actually playing each candidate and testing
//! whether the mover's king is attacked afterwards. That one rule covers
//! pins, check evasion, and the discovered-check edge cases (including the
//! en-passant one) without any special-case tables.

use crate::board::{PieceKind, Side, Square};
use crate::rules::moves::{MoveKind, RawMove};
use crate::rules::position::Position;

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

impl Position {
    /// True if `sq` is attacked by any piece of `by`.
    pub fn is_attacked(&self, sq: Square, by: Side) -> bool {
        // Pawns: a pawn of `by` attacks diagonally forward, so look one
        // rank back from `sq` along `by`'s advance direction.
        let back = -by.pawn_direction();
        for df in [-1, 1] {
            if let Some(from) = sq.offset(df, back) {
                if let Some(p) = self.piece_at(from) {
                    if p.side == by && p.kind == PieceKind::Pawn {
                        return true;
                    }
                }
            }
        }

        for (df, dr) in KNIGHT_STEPS {
            if let Some(from) = sq.offset(df, dr) {
                if let Some(p) = self.piece_at(from) {
                    if p.side == by && p.kind == PieceKind::Knight {
                        return true;
                    }
                }
            }
        }

        for (df, dr) in KING_STEPS {
            if let Some(from) = sq.offset(df, dr) {
                if let Some(p) = self.piece_at(from) {
                    if p.side == by && p.kind == PieceKind::King {
                        return true;
                    }
                }
            }
        }

        for (rays, straight) in [(BISHOP_RAYS, false), (ROOK_RAYS, true)] {
            for (df, dr) in rays {
                let mut cursor = sq;
                while let Some(next) = cursor.offset(df, dr) {
                    cursor = next;
                    if let Some(p) = self.piece_at(cursor) {
                        if p.side == by {
                            let slides = match p.kind {
                                PieceKind::Queen => true,
                                PieceKind::Rook => straight,
                                PieceKind::Bishop => !straight,
                                _ => false,
                            };
                            if slides {
                                return true;
                            }
                        }
                        break;
                    }
                }
            }
        }

        false
    }

    /// True if `side`'s king is currently attacked.
    pub fn in_check(&self, side: Side) -> bool {
        match self.board.king_square(side) {
            Some(king) => self.is_attacked(king, side.opponent()),
            None => false,
        }
    }

    /// Legal raw moves from `from`; empty if the square is empty or holds
    /// the opponent's piece.
    pub(crate) fn legal_raw_from(&self, from: Square) -> Vec<RawMove> {
        let mut moves = self.pseudo_moves_from(from);
        moves.retain(|raw| !self.play_raw(raw).in_check(self.turn));
        moves
    }

    /// Every legal raw move for the side to move.
    pub(crate) fn legal_raw(&self) -> Vec<RawMove> {
        self.board
            .pieces_of(self.turn)
            .flat_map(|(sq, _)| self.legal_raw_from(sq))
            .collect()
    }

    /// True if the side to move has at least one legal move.
    pub fn has_legal_move(&self) -> bool {
        self.board
            .pieces_of(self.turn)
            .any(|(sq, _)| !self.legal_raw_from(sq).is_empty())
    }

    fn pseudo_moves_from(&self, from: Square) -> Vec<RawMove> {
        let Some(piece) = self.piece_at(from) else {
            return Vec::new();
        };
        if piece.side != self.turn {
            return Vec::new();
        }

        let mut moves = Vec::new();
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, &mut moves),
            PieceKind::Knight => self.step_moves(from, &KNIGHT_STEPS, &mut moves),
            PieceKind::Bishop => self.ray_moves(from, &BISHOP_RAYS, &mut moves),
            PieceKind::Rook => self.ray_moves(from, &ROOK_RAYS, &mut moves),
            PieceKind::Queen => {
                self.ray_moves(from, &BISHOP_RAYS, &mut moves);
                self.ray_moves(from, &ROOK_RAYS, &mut moves);
            }
            PieceKind::King => {
                self.step_moves(from, &KING_STEPS, &mut moves);
                self.castle_moves(from, &mut moves);
            }
        }
        moves
    }

    fn step_moves(&self, from: Square, steps: &[(i8, i8)], out: &mut Vec<RawMove>) {
        for &(df, dr) in steps {
            if let Some(to) = from.offset(df, dr) {
                match self.piece_at(to) {
                    Some(p) if p.side == self.turn => {}
                    _ => out.push(RawMove::quiet(from, to)),
                }
            }
        }
    }

    fn ray_moves(&self, from: Square, rays: &[(i8, i8)], out: &mut Vec<RawMove>) {
        for &(df, dr) in rays {
            let mut cursor = from;
            while let Some(to) = cursor.offset(df, dr) {
                cursor = to;
                match self.piece_at(to) {
                    None => out.push(RawMove::quiet(from, to)),
                    Some(p) => {
                        if p.side != self.turn {
                            out.push(RawMove::quiet(from, to));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn pawn_moves(&self, from: Square, out: &mut Vec<RawMove>) {
        let side = self.turn;
        let dir = side.pawn_direction();

        if let Some(one) = from.offset(0, dir) {
            if self.piece_at(one).is_none() {
                self.push_pawn_move(from, one, MoveKind::Quiet, out);
                if from.rank() == side.pawn_rank() {
                    if let Some(two) = one.offset(0, dir) {
                        if self.piece_at(two).is_none() {
                            out.push(RawMove {
                                from,
                                to: two,
                                kind: MoveKind::DoublePush,
                                promotion: None,
                            });
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(df, dir) else {
                continue;
            };
            match self.piece_at(to) {
                Some(p) if p.side != side => {
                    self.push_pawn_move(from, to, MoveKind::Quiet, out);
                }
                None if self.en_passant == Some(to) => {
                    out.push(RawMove {
                        from,
                        to,
                        kind: MoveKind::EnPassant,
                        promotion: None,
                    });
                }
                _ => {}
            }
        }
    }

    /// Pushes a pawn move, fanning out into the four promotion choices on
    /// the last rank.
    fn push_pawn_move(&self, from: Square, to: Square, kind: MoveKind, out: &mut Vec<RawMove>) {
        if to.rank() == self.turn.promotion_rank() {
            for promo in PieceKind::PROMOTIONS {
                out.push(RawMove {
                    from,
                    to,
                    kind,
                    promotion: Some(promo),
                });
            }
        } else {
            out.push(RawMove {
                from,
                to,
                kind,
                promotion: None,
            });
        }
    }

    fn castle_moves(&self, from: Square, out: &mut Vec<RawMove>) {
        let side = self.turn;
        let rank = side.back_rank();
        if from != Square::from_coords(4, rank) {
            return;
        }
        let enemy = side.opponent();
        // Castling out of check is never legal.
        if self.is_attacked(from, enemy) {
            return;
        }

        if self.castling.kingside(side) && self.rook_at(Square::from_coords(7, rank), side) {
            let f = Square::from_coords(5, rank);
            let g = Square::from_coords(6, rank);
            if self.piece_at(f).is_none()
                && self.piece_at(g).is_none()
                && !self.is_attacked(f, enemy)
                && !self.is_attacked(g, enemy)
            {
                out.push(RawMove {
                    from,
                    to: g,
                    kind: MoveKind::CastleKingside,
                    promotion: None,
                });
            }
        }

        if self.castling.queenside(side) && self.rook_at(Square::from_coords(0, rank), side) {
            let b = Square::from_coords(1, rank);
            let c = Square::from_coords(2, rank);
            let d = Square::from_coords(3, rank);
            if self.piece_at(b).is_none()
                && self.piece_at(c).is_none()
                && self.piece_at(d).is_none()
                && !self.is_attacked(d, enemy)
                && !self.is_attacked(c, enemy)
            {
                out.push(RawMove {
                    from,
                    to: c,
                    kind: MoveKind::CastleQueenside,
                    promotion: None,
                });
            }
        }
    }

    fn rook_at(&self, sq: Square, side: Side) -> bool {
        matches!(self.piece_at(sq), Some(p) if p.side == side && p.kind == PieceKind::Rook)
    }
}
