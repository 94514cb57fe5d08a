//! Heuristic computer opponent.
//!
//! Scores every legal move one ply deep (captures, checks, mates), adds
//! difficulty-scaled noise, and samples from a difficulty-sized pool of the
//! top-ranked moves. This is deliberately not a search: weaker tiers are
//! weaker because noise and pool width drown the ranking.

use crate::rules::{Move, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Strength tiers, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Master,
}

impl Difficulty {
    /// Upper bound of the uniform noise added to each move's score.
    /// Wider noise means more random play.
    pub fn noise_range(self) -> f64 {
        match self {
            Difficulty::Beginner => 50.0,
            Difficulty::Intermediate => 20.0,
            Difficulty::Advanced => 5.0,
            Difficulty::Master => 2.0,
        }
    }

    /// How many top-ranked moves are eligible for final selection.
    pub fn pool_size(self, total: usize) -> usize {
        match self {
            Difficulty::Beginner => total,
            Difficulty::Intermediate => total.min(5),
            Difficulty::Advanced => total.min(3),
            Difficulty::Master => 1,
        }
    }
}

const CHECK_BONUS: f64 = 5.0;
const MATE_BONUS: f64 = 1000.0;
const CAPTURE_WEIGHT: f64 = 10.0;

/// Picks a move for the side to move in `position` from its legal moves.
/// Returns `None` when the move list is empty; callers are expected to
/// have checked game-over first.
pub fn select_move<R: Rng + ?Sized>(
    position: &Position,
    legal_moves: &[Move],
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Move> {
    if legal_moves.is_empty() {
        return None;
    }

    let mut scored: Vec<(f64, &Move)> = legal_moves
        .iter()
        .map(|mv| (score_move(position, mv, difficulty, rng), mv))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let pool = difficulty.pool_size(scored.len()).max(1);
    let pick = rng.random_range(0..pool);
    Some(scored[pick].1.clone())
}

fn score_move<R: Rng + ?Sized>(
    position: &Position,
    mv: &Move,
    difficulty: Difficulty,
    rng: &mut R,
) -> f64 {
    let mut score = 0.0;

    if let Some(captured) = mv.captured {
        score += CAPTURE_WEIGHT * captured.value() as f64;
    }

    // One-ply look-ahead for check and mate only. Mate is also check,
    // so a mating move collects both bonuses.
    let next = position.play_move(mv);
    if next.in_check(next.turn) {
        score += CHECK_BONUS;
        if !next.has_legal_move() {
            score += MATE_BONUS;
        }
    }

    score + rng.random_range(0.0..difficulty.noise_range())
}
