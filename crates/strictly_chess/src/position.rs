//! Immutable position snapshots in canonical FEN form.

use super::types::Side;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Immutable snapshot of board, side to move and special-move rights.
///
/// Stored as its canonical six-field FEN encoding, which is what backends
/// receive and what two positions are compared by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    fen: String,
    side_to_move: Side,
}

impl Position {
    /// The standard starting position.
    pub fn starting() -> Self {
        Self {
            fen: STARTING_FEN.to_string(),
            side_to_move: Side::White,
        }
    }

    /// Parses a FEN string, normalising it to six fields.
    ///
    /// Missing halfmove clock and fullmove number default to `0 1`. Only the
    /// field layout and side to move are checked here; board legality is the
    /// provider's business.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if fewer than four fields are present or the
    /// side-to-move field is not `w` or `b`.
    #[instrument(skip(fen))]
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(PositionError::new(format!(
                "expected 4 to 6 FEN fields, got {}",
                fields.len()
            )));
        }

        let side_to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            other => {
                return Err(PositionError::new(format!(
                    "invalid side to move '{}'",
                    other
                )));
            }
        };

        let halfmove = fields.get(4).copied().unwrap_or("0");
        let fullmove = fields.get(5).copied().unwrap_or("1");
        let fen = format!("{} {} {}", fields[..4].join(" "), halfmove, fullmove);

        Ok(Self { fen, side_to_move })
    }

    /// Builds a position from parts already known to be consistent.
    pub(crate) fn from_parts(fen: String, side_to_move: Side) -> Self {
        Self { fen, side_to_move }
    }

    /// Canonical text encoding (FEN).
    pub fn encoding(&self) -> &str {
        &self.fen
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Halfmove clock, as recorded in the encoding.
    pub fn halfmove_clock(&self) -> u32 {
        self.field(4).and_then(|f| f.parse().ok()).unwrap_or(0)
    }

    /// Fullmove number, as recorded in the encoding.
    pub fn fullmove_number(&self) -> u32 {
        self.field(5).and_then(|f| f.parse().ok()).unwrap_or(1)
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.fen.split_whitespace().nth(index)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fen)
    }
}

/// Position parsing error.
#[derive(Debug, Clone, Display, Error)]
#[display("Position error: {} at {}:{}", message, file, line)]
pub struct PositionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PositionError {
    /// Creates a new position error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
