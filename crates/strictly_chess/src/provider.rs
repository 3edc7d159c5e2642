//! Legal-move provider port.
//!
//! The game-state machine never computes chess rules itself. Everything it
//! knows about legality and termination comes through this trait, so tests
//! can inject a scripted provider and production code injects [`ChessRules`].
//!
//! [`ChessRules`]: crate::ChessRules

use super::action::{IllegalMoveError, LegalMove, Move};
use super::phases::GameState;
use super::position::Position;
use super::types::Side;

/// Source of truth for positions, legal moves and termination.
pub trait LegalMoveProvider: Send + std::fmt::Debug {
    /// Current position.
    fn position(&self) -> Position;

    /// Side to move.
    fn turn(&self) -> Side;

    /// Legal moves from the current position, in verbose form.
    fn legal_moves(&self) -> Vec<LegalMove>;

    /// Whether the game is still in progress, and why not if it is over.
    fn status(&self) -> GameState;

    /// Whether the game is over.
    fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Plays a move, returning its verbose form.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] without changing state if the move is not
    /// legal in the current position.
    fn play(&mut self, mv: &Move) -> Result<LegalMove, IllegalMoveError>;

    /// Returns to the position the provider was created with.
    fn reset(&mut self);
}
