//! The authoritative game-state machine.
//!
//! Owns the canonical position (through its provider), the move history and
//! the terminal flag. [`GameStateMachine::apply_move`] is the only way moves
//! enter a game.

use super::action::{IllegalMoveError, LegalMove, Move};
use super::contracts::{Contract, InLegalSet, MoveContract};
use super::phases::GameState;
use super::position::{Position, PositionError};
use super::provider::LegalMoveProvider;
use super::record::MoveRecord;
use super::rules::ChessRules;
use super::types::Side;
use tracing::{debug, info, instrument};

/// Game-state machine: `InProgress` until a move ends the game, then
/// `Terminal(reason)` until [`reset`](Self::reset).
#[derive(Debug)]
pub struct GameStateMachine {
    pub(crate) provider: Box<dyn LegalMoveProvider>,
    pub(crate) initial: Position,
    pub(crate) history: Vec<MoveRecord>,
    pub(crate) state: GameState,
}

impl GameStateMachine {
    /// Creates a machine over an injected provider. The provider's current
    /// position becomes the initial position.
    #[instrument(skip(provider))]
    pub fn new(provider: Box<dyn LegalMoveProvider>) -> Self {
        let initial = provider.position();
        let state = provider.status();
        info!(fen = %initial, ?state, "Creating game-state machine");
        Self {
            provider,
            initial,
            history: Vec::new(),
            state,
        }
    }

    /// Standard chess from the usual starting position.
    pub fn standard() -> Self {
        Self::new(Box::new(ChessRules::new()))
    }

    /// Standard chess from an arbitrary position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if the position is not a valid board.
    pub fn from_position(position: &Position) -> Result<Self, PositionError> {
        Ok(Self::new(Box::new(ChessRules::from_position(position)?)))
    }

    /// Applies a move.
    ///
    /// The move must belong to the side on move and be a member of the
    /// current legal-move set. On success the position advances, a
    /// [`MoveRecord`] is appended and termination is re-evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] and leaves state unchanged if the game is
    /// over, it is the other side's turn, or the move is not legal.
    #[instrument(skip(self, mv), fields(mv = %mv, ply = self.history.len() + 1))]
    pub fn apply_move(&mut self, mv: Move) -> Result<MoveRecord, IllegalMoveError> {
        MoveContract::pre(self, &mv)?;

        let legal = self.provider.play(&mv)?;
        let record = MoveRecord::new(self.history.len() + 1, legal, self.provider.position());
        self.history.push(record.clone());
        self.state = self.provider.status();

        #[cfg(debug_assertions)]
        MoveContract::post(self)?;

        debug!(description = %record.description(), state = ?self.state, "Move applied");
        if let GameState::Terminal(reason) = self.state {
            info!(%reason, plies = self.history.len(), "Game over");
        }
        Ok(record)
    }

    /// Discards history and returns to the initial position.
    #[instrument(skip(self), fields(plies = self.history.len()))]
    pub fn reset(&mut self) {
        self.provider.reset();
        self.history.clear();
        self.state = self.provider.status();
        info!(fen = %self.initial, "Game reset");
    }

    /// Verbose legal move matching `mv`, if it is legal right now.
    pub fn find_legal(&self, mv: &Move) -> Option<LegalMove> {
        InLegalSet::check(mv, self).ok()
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.provider.position()
    }

    /// Position the game started from.
    pub fn initial_position(&self) -> &Position {
        &self.initial
    }

    /// Position before ply `index + 1`: index 0 is the initial position.
    pub fn position_at(&self, index: usize) -> Option<&Position> {
        match index {
            0 => Some(&self.initial),
            n => self.history.get(n - 1).map(|record| record.position()),
        }
    }

    /// Side to move.
    pub fn turn(&self) -> Side {
        self.provider.turn()
    }

    /// Legal moves in the current position; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        if self.state.is_terminal() {
            Vec::new()
        } else {
            self.provider.legal_moves()
        }
    }

    /// Current phase.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Whether the game is over.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Applied moves in order.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Most recent move, if any.
    pub fn last_record(&self) -> Option<&MoveRecord> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TerminationReason, phases::DrawRule};

    fn coordinate(machine: &GameStateMachine, text: &str) -> Move {
        Move::from_coordinate(text, machine.turn()).unwrap()
    }

    #[test]
    fn test_apply_move_grows_history_by_one() {
        let mut machine = GameStateMachine::standard();
        let mv = coordinate(&machine, "e2e4");
        let record = machine.apply_move(mv).unwrap();

        assert_eq!(record.ply(), 1);
        assert_eq!(record.mover(), Side::White);
        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.turn(), Side::Black);
        assert_eq!(record.description(), "White pawn e2-e4");
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut machine = GameStateMachine::standard();
        let before = machine.position();
        let mv = coordinate(&machine, "e2e5");

        assert_eq!(machine.apply_move(mv), Err(IllegalMoveError::NotLegal(mv)));
        assert_eq!(machine.position(), before);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_terminal_state_rejects_moves() {
        let mut machine = GameStateMachine::standard();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let mv = coordinate(&machine, text);
            machine.apply_move(mv).unwrap();
        }
        assert_eq!(
            machine.state(),
            GameState::Terminal(TerminationReason::Checkmate)
        );
        assert!(machine.legal_moves().is_empty());

        let mv = coordinate(&machine, "e1f2");
        assert_eq!(
            machine.apply_move(mv),
            Err(IllegalMoveError::GameOver(TerminationReason::Checkmate))
        );
    }

    #[test]
    fn test_draw_by_rule_positions_still_have_no_legal_moves() {
        let position = Position::from_fen("8/8/8/4k3/8/8/3NK3/8 w - - 0 1").unwrap();
        let machine = GameStateMachine::from_position(&position).unwrap();
        assert_eq!(
            machine.state(),
            GameState::Terminal(TerminationReason::DrawByRule(
                DrawRule::InsufficientMaterial
            ))
        );
        assert!(machine.legal_moves().is_empty());
    }

    #[test]
    fn test_position_at_indexes_history() {
        let mut machine = GameStateMachine::standard();
        let initial = machine.position();
        let mv = coordinate(&machine, "d2d4");
        machine.apply_move(mv).unwrap();

        assert_eq!(machine.position_at(0), Some(&initial));
        assert_eq!(machine.position_at(1), Some(&machine.position()));
        assert_eq!(machine.position_at(2), None);
    }
}
