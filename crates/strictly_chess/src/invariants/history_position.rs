//! History agrees with the provider's current position.

use super::Invariant;
use crate::GameStateMachine;
use tracing::{instrument, warn};

/// Ply numbers run 1..=n and the last recorded position (or the initial one
/// when history is empty) is the provider's current position.
pub struct HistoryPositionInvariant;

impl Invariant<GameStateMachine> for HistoryPositionInvariant {
    #[instrument(skip(machine))]
    fn holds(machine: &GameStateMachine) -> bool {
        let numbered = machine
            .history()
            .iter()
            .enumerate()
            .all(|(index, record)| record.ply() == index + 1);
        if !numbered {
            warn!("Ply numbers are not contiguous");
            return false;
        }

        let recorded = machine
            .last_record()
            .map(|record| record.position().clone())
            .unwrap_or_else(|| machine.initial_position().clone());
        let current = machine.position();
        let valid = recorded == current;
        if !valid {
            warn!(recorded = %recorded, current = %current, "History diverged from provider");
        }
        valid
    }

    fn description() -> &'static str {
        "Last recorded position equals the current position"
    }
}
