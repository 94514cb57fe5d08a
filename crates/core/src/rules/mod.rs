//! Rules engine: positions, legal-move generation, and game state

mod game;
mod movegen;
mod moves;
mod position;
mod san;

pub use game::{Game, GameState, LastMove};
pub use moves::{Move, MoveKind};
pub use position::Position;
