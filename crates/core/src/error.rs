//! Error types for chess-client-core

use crate::board::Square;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid position encoding: {0}")]
    InvalidEncoding(String),

    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },

    #[error("no moves to undo")]
    EmptyHistory,

    #[error("move selector invoked with no legal moves; game-over was not checked first")]
    NoLegalMoves,
}

pub type Result<T> = std::result::Result<T, Error>;
