//! Strictly Chess core - a type-safe chess game-state machine
//!
//! This crate owns the rules side of a human-versus-opponent chess game:
//! legal move generation, move application, termination detection and
//! outcome attribution. It has no I/O; opponents, sessions and persistence
//! live in the arena crate.
//!
//! # Architecture
//!
//! - **Provider**: [`LegalMoveProvider`] answers "what is legal here" ([`ChessRules`])
//! - **Machine**: [`GameStateMachine`] is the single authority for position and history
//! - **Contracts**: preconditions on every move, invariants after it in debug builds
//! - **Outcome**: [`OutcomeEvaluator`] credits the recorded mover on checkmate
//!
//! # Example
//!
//! ```
//! use strictly_chess::{GameStateMachine, Move, Side};
//!
//! let mut machine = GameStateMachine::standard();
//! let mv = Move::from_coordinate("e2e4", Side::White).unwrap();
//! let record = machine.apply_move(mv).unwrap();
//! assert_eq!(record.mover(), Side::White);
//! assert_eq!(machine.turn(), Side::Black);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod contracts;
mod invariants;
mod machine;
mod outcome;
mod phases;
mod position;
mod provider;
mod record;
mod rules;
mod types;

// Crate-level exports - Primitive types
pub use types::{PieceKind, Side, Square};

// Crate-level exports - Moves and errors
pub use action::{IllegalMoveError, LegalMove, Move, MoveParseError};

// Crate-level exports - Positions
pub use position::{Position, PositionError, STARTING_FEN};

// Crate-level exports - Phases
pub use phases::{DrawRule, GameState, TerminationReason};

// Crate-level exports - Rules and machine
pub use machine::GameStateMachine;
pub use provider::LegalMoveProvider;
pub use record::MoveRecord;
pub use rules::ChessRules;

// Crate-level exports - Contracts and invariants
pub use contracts::{Contract, GameInProgress, InLegalSet, MoveContract, MoversTurn};
pub use invariants::{
    AlternatingMoverInvariant, ChessInvariants, HistoryPositionInvariant, Invariant,
    InvariantViolation, TerminalConsistentInvariant,
};

// Crate-level exports - Outcomes
pub use outcome::{GameOutcome, OutcomeEvaluator, PlayerResult};
