//! Contract-based validation for move application.
//!
//! Contracts formalize Hoare-style reasoning: {P} apply_move {Q}.
//! Preconditions are always enforced; postconditions run in debug builds.

use super::action::{IllegalMoveError, LegalMove, Move};
use super::invariants::ChessInvariants;
use super::machine::GameStateMachine;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), IllegalMoveError>;

    /// Checks postconditions after applying the action.
    fn post(after: &S) -> Result<(), IllegalMoveError>;
}

/// Precondition: the game is not over.
pub struct GameInProgress;

impl GameInProgress {
    /// Fails with [`IllegalMoveError::GameOver`] on a terminal machine.
    pub fn check(machine: &GameStateMachine) -> Result<(), IllegalMoveError> {
        match machine.state().reason() {
            Some(reason) => Err(IllegalMoveError::GameOver(reason)),
            None => Ok(()),
        }
    }
}

/// Precondition: the move belongs to the side on move.
pub struct MoversTurn;

impl MoversTurn {
    /// Fails with [`IllegalMoveError::WrongTurn`] otherwise.
    pub fn check(mv: &Move, machine: &GameStateMachine) -> Result<(), IllegalMoveError> {
        let to_move = machine.turn();
        if mv.side != to_move {
            Err(IllegalMoveError::WrongTurn {
                side: mv.side,
                to_move,
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: the move is a member of the current legal-move set.
pub struct InLegalSet;

impl InLegalSet {
    /// Returns the verbose legal move on success.
    pub fn check(mv: &Move, machine: &GameStateMachine) -> Result<LegalMove, IllegalMoveError> {
        machine
            .legal_moves()
            .into_iter()
            .find(|legal| legal.mv() == *mv)
            .ok_or(IllegalMoveError::NotLegal(*mv))
    }
}

/// Contract for [`GameStateMachine::apply_move`].
///
/// Preconditions: game in progress, mover's turn, move in the legal set.
/// Postconditions: every invariant in [`ChessInvariants`].
pub struct MoveContract;

impl Contract<GameStateMachine, Move> for MoveContract {
    #[instrument(skip(machine), fields(mv = %action))]
    fn pre(machine: &GameStateMachine, action: &Move) -> Result<(), IllegalMoveError> {
        GameInProgress::check(machine)?;
        MoversTurn::check(action, machine)?;
        InLegalSet::check(action, machine)?;
        Ok(())
    }

    fn post(after: &GameStateMachine) -> Result<(), IllegalMoveError> {
        ChessInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(violations = %descriptions, "Postcondition failed");
            IllegalMoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
