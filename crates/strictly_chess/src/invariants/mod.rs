//! First-class invariants for the game-state machine.
//!
//! Invariants are logical properties that must hold after every transition.
//! They are checked as postconditions in debug builds and can be tested
//! independently.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

pub mod alternating_mover;
pub mod history_position;
pub mod terminal_consistent;

pub use alternating_mover::AlternatingMoverInvariant;
pub use history_position::HistoryPositionInvariant;
pub use terminal_consistent::TerminalConsistentInvariant;

use crate::GameStateMachine;

type Check = (fn(&GameStateMachine) -> bool, fn() -> &'static str);

/// Every invariant of the game-state machine, checked together.
pub struct ChessInvariants;

impl ChessInvariants {
    const CHECKS: [Check; 3] = [
        (
            <AlternatingMoverInvariant as Invariant<GameStateMachine>>::holds,
            <AlternatingMoverInvariant as Invariant<GameStateMachine>>::description,
        ),
        (
            <HistoryPositionInvariant as Invariant<GameStateMachine>>::holds,
            <HistoryPositionInvariant as Invariant<GameStateMachine>>::description,
        ),
        (
            <TerminalConsistentInvariant as Invariant<GameStateMachine>>::holds,
            <TerminalConsistentInvariant as Invariant<GameStateMachine>>::description,
        ),
    ];

    /// Checks every invariant, collecting all violations rather than
    /// stopping at the first.
    pub fn check_all(machine: &GameStateMachine) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = Self::CHECKS
            .iter()
            .filter(|(holds, _)| !holds(machine))
            .map(|(_, description)| InvariantViolation::new(description()))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
