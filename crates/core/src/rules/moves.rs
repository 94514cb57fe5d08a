//! Move representation

use crate::board::{PieceKind, Square};
use serde::{Deserialize, Serialize};

/// Special-move classification. Promotion is orthogonal (a capture can
/// promote) and lives in [`Move::promotion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Quiet,
    DoublePush,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

/// A single applied or applicable move. Created by the rules engine,
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub kind: MoveKind,
    /// Short algebraic notation, e.g. "Qxf7#".
    pub san: String,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.san)
    }
}

/// Internal move shape used during generation, before capture/SAN
/// bookkeeping is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawMove {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
}

impl RawMove {
    pub(crate) fn quiet(from: Square, to: Square) -> Self {
        RawMove {
            from,
            to,
            kind: MoveKind::Quiet,
            promotion: None,
        }
    }
}
