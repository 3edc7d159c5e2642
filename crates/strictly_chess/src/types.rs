//! Core domain types for chess: sides, squares and piece kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the two sides of the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Side {
    /// White moves first from the standard starting position.
    White,
    /// Black.
    Black,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Zero-based rank a pawn of this side stands on one step before promoting.
    pub fn penultimate_rank(self) -> u8 {
        match self {
            Side::White => 6,
            Side::Black => 1,
        }
    }

    /// Zero-based rank on which a pawn of this side promotes.
    pub fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }

    /// FEN side-to-move letter.
    pub fn fen_letter(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

/// A square on the board, addressed by zero-based file (a = 0) and rank (1 = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Creates a square from zero-based file and rank, or `None` if off the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Square from a 0..64 index, file-major within each rank (a1 = 0, h8 = 63).
    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            file: (index % 8) as u8,
            rank: ((index / 8) % 8) as u8,
        }
    }

    /// Parses a square from its file letter and rank digit (`'e'`, `'4'`).
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Self::new(file as u8 - b'a', rank as u8 - b'1')
    }

    /// Zero-based file.
    pub fn file(self) -> u8 {
        self.file
    }

    /// Zero-based rank.
    pub fn rank(self) -> u8 {
        self.rank
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl std::str::FromStr for Square {
    type Err = crate::MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Self::from_chars(file, rank)
                .ok_or_else(|| crate::MoveParseError::BadSquare(s.to_string())),
            _ => Err(crate::MoveParseError::BadSquare(s.to_string())),
        }
    }
}

/// Kind of chess piece, without colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Lowercase letter used in coordinate moves and FEN.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parses a promotion letter. Only knight, bishop, rook and queen qualify.
    pub fn from_promotion_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            _ => None,
        }
    }
}
