//! Short algebraic notation rendering

use crate::board::{PieceKind, Square};
use crate::rules::moves::{MoveKind, RawMove};
use crate::rules::position::Position;

/// Renders `raw` (a legal move of `pos`) as SAN, including the `+`/`#`
/// suffix taken from the resulting position.
pub(crate) fn render(pos: &Position, raw: &RawMove) -> String {
    let mut san = body(pos, raw);

    let next = pos.play_raw(raw);
    if next.in_check(next.turn) {
        san.push(if next.has_legal_move() { '+' } else { '#' });
    }
    san
}

fn body(pos: &Position, raw: &RawMove) -> String {
    match raw.kind {
        MoveKind::CastleKingside => return "O-O".to_string(),
        MoveKind::CastleQueenside => return "O-O-O".to_string(),
        _ => {}
    }

    let piece = pos
        .piece_at(raw.from)
        .map(|p| p.kind)
        .unwrap_or(PieceKind::Pawn);
    let is_capture = raw.kind == MoveKind::EnPassant || pos.piece_at(raw.to).is_some();

    let mut san = String::new();
    if piece == PieceKind::Pawn {
        if is_capture {
            san.push(raw.from.file_char());
        }
    } else {
        san.push_str(piece.san_letter());
        san.push_str(&disambiguation(pos, raw, piece));
    }
    if is_capture {
        san.push('x');
    }
    san.push_str(&raw.to.to_string());
    if let Some(promo) = raw.promotion {
        san.push('=');
        san.push_str(promo.san_letter());
    }
    san
}

/// Minimal from-square qualifier when another piece of the same kind can
/// also reach the destination: file first, then rank, then both.
fn disambiguation(pos: &Position, raw: &RawMove, piece: PieceKind) -> String {
    let rivals: Vec<Square> = pos
        .legal_raw()
        .into_iter()
        .filter(|other| {
            other.to == raw.to
                && other.from != raw.from
                && pos.piece_at(other.from).map(|p| p.kind) == Some(piece)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.file() != raw.from.file()) {
        return raw.from.file_char().to_string();
    }
    if rivals.iter().all(|sq| sq.rank() != raw.from.rank()) {
        return raw.from.rank_char().to_string();
    }
    raw.from.to_string()
}
