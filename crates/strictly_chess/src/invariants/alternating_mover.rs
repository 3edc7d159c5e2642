//! Movers alternate, starting from the initial side to move.

use super::Invariant;
use crate::GameStateMachine;
use tracing::{instrument, warn};

/// Every record's mover is the opponent of the previous record's mover, and
/// the first mover is the side to move in the initial position.
pub struct AlternatingMoverInvariant;

impl Invariant<GameStateMachine> for AlternatingMoverInvariant {
    #[instrument(skip(machine))]
    fn holds(machine: &GameStateMachine) -> bool {
        let mut expected = machine.initial_position().side_to_move();
        for record in machine.history() {
            if record.mover() != expected {
                warn!(
                    ply = record.ply(),
                    mover = %record.mover(),
                    expected = %expected,
                    "Mover out of turn in history"
                );
                return false;
            }
            expected = expected.opponent();
        }
        true
    }

    fn description() -> &'static str {
        "Movers alternate starting from the initial side to move"
    }
}
