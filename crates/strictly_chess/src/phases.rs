//! Game phases and termination reasons.

use serde::{Deserialize, Serialize};

/// Rule under which a game is drawn without stalemate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum DrawRule {
    /// One hundred plies without a pawn move or capture.
    #[display("fifty-move rule")]
    FiftyMove,
    /// The same position occurred three times.
    #[display("threefold repetition")]
    ThreefoldRepetition,
    /// Neither side can possibly deliver mate.
    #[display("insufficient material")]
    InsufficientMaterial,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum TerminationReason {
    /// The side to move is in check with no legal move.
    #[display("checkmate")]
    Checkmate,
    /// The side to move is not in check and has no legal move.
    #[display("stalemate")]
    Stalemate,
    /// Drawn by rule.
    #[display("draw by {}", _0)]
    DrawByRule(DrawRule),
}

/// Phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Moves are still accepted.
    InProgress,
    /// The game is over.
    Terminal(TerminationReason),
}

impl GameState {
    /// Whether the game is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::Terminal(_))
    }

    /// Termination reason, if the game is over.
    pub fn reason(&self) -> Option<TerminationReason> {
        match self {
            GameState::InProgress => None,
            GameState::Terminal(reason) => Some(*reason),
        }
    }
}
