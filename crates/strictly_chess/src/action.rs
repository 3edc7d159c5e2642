//! First-class move types.
//!
//! Moves are domain events, not side effects. A [`Move`] is a side's intent
//! and can be validated against a legal-move set before anything changes.

use super::phases::TerminationReason;
use super::types::{PieceKind, Side, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A move: origin, destination, optional promotion and the side making it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Side making the move.
    pub side: Side,
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Piece a pawn promotes to, if any.
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a new move.
    pub fn new(side: Side, from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self {
            side,
            from,
            to,
            promotion,
        }
    }

    /// Decodes a coordinate move such as `e2e4` or `e7e8q` for `side`.
    ///
    /// Surrounding whitespace, quotes and backticks are ignored. The first two
    /// characters are the origin, the next two the destination, and an
    /// optional fifth is the promotion letter. The promotion is attached only
    /// when the origin is the moving side's penultimate pawn rank; otherwise
    /// the fifth character is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MoveParseError`] for any other length, an unknown square, or
    /// an invalid promotion letter on a promoting move.
    #[instrument]
    pub fn from_coordinate(text: &str, side: Side) -> Result<Self, MoveParseError> {
        let trimmed = text
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
            .trim();
        let chars: Vec<char> = trimmed.chars().collect();

        if chars.len() != 4 && chars.len() != 5 {
            return Err(MoveParseError::WrongLength(trimmed.to_string()));
        }

        let from = Square::from_chars(chars[0], chars[1])
            .ok_or_else(|| MoveParseError::BadSquare(chars[..2].iter().collect()))?;
        let to = Square::from_chars(chars[2], chars[3])
            .ok_or_else(|| MoveParseError::BadSquare(chars[2..4].iter().collect()))?;

        let promotion = match chars.get(4) {
            Some(&letter) if from.rank() == side.penultimate_rank() => Some(
                PieceKind::from_promotion_letter(letter)
                    .ok_or(MoveParseError::BadPromotion(letter))?,
            ),
            _ => None,
        };

        Ok(Self::new(side, from, to, promotion))
    }

    /// Returns the same move promoting to `piece`.
    pub fn with_promotion(self, piece: PieceKind) -> Self {
        Self {
            promotion: Some(piece),
            ..self
        }
    }

    /// Coordinate encoding (`e2e4`, `e7e8q`).
    pub fn coordinate(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.letter())?;
        }
        Ok(())
    }
}

/// Verbose form of a legal move, as reported by a legal-move provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalMove {
    mv: Move,
    piece: PieceKind,
    captured: Option<PieceKind>,
    castle: bool,
}

impl LegalMove {
    /// Creates a verbose legal move.
    pub fn new(mv: Move, piece: PieceKind, captured: Option<PieceKind>, castle: bool) -> Self {
        Self {
            mv,
            piece,
            captured,
            castle,
        }
    }

    /// The underlying move.
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// The piece being moved.
    pub fn piece(&self) -> PieceKind {
        self.piece
    }

    /// The piece captured by this move, if any.
    pub fn captured(&self) -> Option<PieceKind> {
        self.captured
    }

    /// Whether this move promotes a pawn.
    pub fn is_promotion(&self) -> bool {
        self.mv.promotion.is_some()
    }

    /// Whether this move castles.
    pub fn is_castle(&self) -> bool {
        self.castle
    }

    /// Human-readable description: mover, piece, squares and capture info.
    pub fn describe(&self) -> String {
        if self.castle {
            let wing = if self.mv.to.file() > self.mv.from.file() {
                "kingside"
            } else {
                "queenside"
            };
            return format!("{} castles {} ({})", self.mv.side, wing, self.mv);
        }

        let separator = if self.captured.is_some() { 'x' } else { '-' };
        let mut text = format!(
            "{} {} {}{}{}",
            self.mv.side, self.piece, self.mv.from, separator, self.mv.to
        );
        if let Some(captured) = self.captured {
            text.push_str(&format!(" capturing {}", captured));
        }
        if let Some(promotion) = self.mv.promotion {
            text.push_str(&format!(", promoting to {}", promotion));
        }
        text
    }
}

/// Error decoding a coordinate move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveParseError {
    /// Text is not four or five characters long.
    #[display("expected 4 or 5 characters, got '{}'", _0)]
    WrongLength(String),

    /// A square could not be read.
    #[display("'{}' is not a square", _0)]
    BadSquare(String),

    /// The promotion letter is not n, b, r or q.
    #[display("'{}' is not a promotion piece", _0)]
    BadPromotion(char),
}

impl std::error::Error for MoveParseError {}

/// A move was rejected. State is always left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum IllegalMoveError {
    /// The move is not in the legal-move set of the current position.
    #[display("{} is not a legal move in this position", _0)]
    NotLegal(Move),

    /// The move belongs to the side that is not on move.
    #[display("{} cannot move, it is {}'s turn", side, to_move)]
    WrongTurn {
        /// Side that tried to move.
        side: Side,
        /// Side actually on move.
        to_move: Side,
    },

    /// The game has already ended.
    #[display("Game is already over ({})", _0)]
    GameOver(TerminationReason),

    /// An opponent move is being resolved; human input is locked.
    #[display("Waiting for the opponent to move")]
    AwaitingOpponent,

    /// Input text could not be decoded into a move.
    #[display("Could not read move '{}': {}", input, reason)]
    Unparseable {
        /// Raw input.
        input: String,
        /// Decoding failure.
        reason: MoveParseError,
    },

    /// A postcondition failed after applying a move.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for IllegalMoveError {}
