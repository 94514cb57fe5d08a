//! Squares, pieces, castling rights, and the array-backed board.

mod grid;
mod types;

pub use grid::Board;
pub use types::{CastlingRights, Piece, PieceKind, Side, Square};
