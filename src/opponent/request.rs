//! Opponent requests, attempt failures and resolutions.

use super::backend::BackendError;
use super::style::Style;
use derive_more::Display;
use std::time::Duration;
use strictly_chess::{GameStateMachine, Move, MoveParseError, Position, Side};
use tracing::instrument;

/// Everything an opponent needs to choose a move.
///
/// Only constructible with a non-empty legal-move set.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentRequest {
    position: Position,
    style: Style,
    legal_moves: Vec<Move>,
    generation: u64,
}

impl OpponentRequest {
    /// Creates a request, or `None` if there is nothing to choose from.
    pub fn new(
        position: Position,
        style: Style,
        legal_moves: Vec<Move>,
        generation: u64,
    ) -> Option<Self> {
        if legal_moves.is_empty() {
            return None;
        }
        Some(Self {
            position,
            style,
            legal_moves,
            generation,
        })
    }

    /// Request for whoever is on move in `machine`. `None` once the game is
    /// over.
    #[instrument(skip(machine), fields(turn = %machine.turn()))]
    pub fn from_machine(machine: &GameStateMachine, style: Style, generation: u64) -> Option<Self> {
        let legal = machine.legal_moves().iter().map(|l| l.mv()).collect();
        Self::new(machine.position(), style, legal, generation)
    }

    /// Position to move from.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Side on move.
    pub fn side(&self) -> Side {
        self.position.side_to_move()
    }

    /// Requested style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Legal moves; never empty.
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    /// Legal moves in coordinate form.
    pub fn legal_coordinates(&self) -> Vec<String> {
        self.legal_moves.iter().map(Move::coordinate).collect()
    }

    /// Session generation the request was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Decodes a backend reply and checks membership in the legal set.
    ///
    /// # Errors
    ///
    /// Returns [`AttemptError::Unparseable`] or
    /// [`AttemptError::NotInLegalSet`].
    pub fn accept(&self, reply: &str) -> Result<Move, AttemptError> {
        let mv = Move::from_coordinate(reply, self.side()).map_err(|reason| {
            AttemptError::Unparseable {
                reply: reply.to_string(),
                reason,
            }
        })?;
        if self.legal_moves.contains(&mv) {
            Ok(mv)
        } else {
            Err(AttemptError::NotInLegalSet(mv))
        }
    }
}

/// One failed backend attempt. Absorbed by the retry loop.
#[derive(Debug, Clone, Display)]
pub enum AttemptError {
    /// Reply did not decode as a coordinate move.
    #[display("Unparseable reply {:?}: {}", reply, reason)]
    Unparseable {
        /// Raw reply text.
        reply: String,
        /// Decoding failure.
        reason: MoveParseError,
    },
    /// Reply decoded but is not legal here.
    #[display("Move {} is not in the legal set", _0)]
    NotInLegalSet(Move),
    /// Transport or protocol failure.
    #[display("Backend failed: {}", _0)]
    Backend(BackendError),
    /// No reply within the attempt timeout.
    #[display("No reply within {:?}", _0)]
    TimedOut(Duration),
}

impl std::error::Error for AttemptError {}

/// Where a resolved move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MoveSource {
    /// The configured backend.
    #[display("backend")]
    Backend,
    /// Uniform random choice after the backend failed.
    #[display("fallback")]
    Fallback,
}

/// A guaranteed-legal opponent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    mv: Move,
    attempts: u32,
    source: MoveSource,
}

impl Resolution {
    pub(crate) fn new(mv: Move, attempts: u32, source: MoveSource) -> Self {
        Self {
            mv,
            attempts,
            source,
        }
    }

    /// The chosen move.
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Backend calls made.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Backend or fallback.
    pub fn source(&self) -> MoveSource {
        self.source
    }

    /// Whether the fallback chose the move.
    pub fn is_fallback(&self) -> bool {
        self.source == MoveSource::Fallback
    }
}
