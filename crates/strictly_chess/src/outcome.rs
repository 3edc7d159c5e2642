//! Outcome attribution at termination.

use super::machine::GameStateMachine;
use super::phases::TerminationReason;
use super::record::MoveRecord;
use super::types::Side;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, instrument};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOutcome {
    reason: TerminationReason,
    winner: Option<Side>,
}

impl GameOutcome {
    /// Why the game ended.
    pub fn reason(&self) -> TerminationReason {
        self.reason
    }

    /// Winning side, or `None` for a draw.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Whether the game was drawn.
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner {
            Some(side) => write!(f, "{} wins by {}", side, self.reason),
            None => write!(f, "Draw ({})", self.reason),
        }
    }
}

/// Result of a game from one side's point of view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerResult {
    /// The side won.
    Win,
    /// The side lost.
    Loss,
    /// The game was drawn.
    Draw,
}

impl PlayerResult {
    /// Result of `outcome` for `side`.
    pub fn for_side(outcome: &GameOutcome, side: Side) -> Self {
        match outcome.winner {
            None => PlayerResult::Draw,
            Some(winner) if winner == side => PlayerResult::Win,
            Some(_) => PlayerResult::Loss,
        }
    }
}

/// Derives win/loss/draw attribution at termination.
pub struct OutcomeEvaluator;

impl OutcomeEvaluator {
    /// Attributes a result from the terminating move and the reason.
    ///
    /// Checkmate: the recorded mover wins. Anything else is a draw.
    #[instrument(skip(last), fields(ply = last.ply(), mover = %last.mover()))]
    pub fn evaluate(last: &MoveRecord, reason: TerminationReason) -> GameOutcome {
        let winner = match reason {
            TerminationReason::Checkmate => Some(last.mover()),
            TerminationReason::Stalemate | TerminationReason::DrawByRule(_) => None,
        };
        debug!(?winner, %reason, "Outcome evaluated");
        GameOutcome { reason, winner }
    }

    /// Outcome of a machine, or `None` while the game is in progress.
    ///
    /// A game that starts in a terminal position has no terminating move;
    /// a mate there is credited to the side not on move.
    #[instrument(skip(machine))]
    pub fn evaluate_machine(machine: &GameStateMachine) -> Option<GameOutcome> {
        let reason = machine.state().reason()?;
        Some(match machine.last_record() {
            Some(last) => Self::evaluate(last, reason),
            None => GameOutcome {
                reason,
                winner: (reason == TerminationReason::Checkmate)
                    .then(|| machine.turn().opponent()),
            },
        })
    }
}
