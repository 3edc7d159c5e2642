//! Terminal flag agrees with the provider.

use super::Invariant;
use crate::GameStateMachine;

/// The machine's cached state is what the provider reports.
pub struct TerminalConsistentInvariant;

impl Invariant<GameStateMachine> for TerminalConsistentInvariant {
    fn holds(machine: &GameStateMachine) -> bool {
        machine.state() == machine.provider.status()
    }

    fn description() -> &'static str {
        "Terminal state matches the provider's status"
    }
}
