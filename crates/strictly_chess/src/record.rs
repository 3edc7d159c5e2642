//! Move history entries.

use super::action::{LegalMove, Move};
use super::position::Position;
use super::types::Side;
use serde::{Deserialize, Serialize};

/// One applied move and the position it produced.
///
/// The mover is stored explicitly. Nothing downstream should recover it from
/// ply parity, since a game may start from a position with Black to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    ply: usize,
    mover: Side,
    legal: LegalMove,
    position: Position,
    description: String,
}

impl MoveRecord {
    pub(crate) fn new(ply: usize, legal: LegalMove, position: Position) -> Self {
        Self {
            ply,
            mover: legal.mv().side,
            description: legal.describe(),
            legal,
            position,
        }
    }

    /// One-based ply number.
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Side that made the move.
    pub fn mover(&self) -> Side {
        self.mover
    }

    /// The move.
    pub fn mv(&self) -> Move {
        self.legal.mv()
    }

    /// Verbose form of the move (piece, capture).
    pub fn legal_move(&self) -> &LegalMove {
        &self.legal
    }

    /// Position after the move.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.ply, self.description)
    }
}
