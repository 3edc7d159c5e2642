//! Chess rules backed by the `chess` crate's move generator.

use super::action::{IllegalMoveError, LegalMove, Move};
use super::phases::{DrawRule, GameState, TerminationReason};
use super::position::{Position, PositionError};
use super::provider::LegalMoveProvider;
use super::types::{PieceKind, Side, Square};
use chess::{Board, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Halfmove clock value at which the fifty-move rule ends the game.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that end the game by repetition.
const REPETITION_LIMIT: u32 = 3;

/// [`LegalMoveProvider`] implementing standard chess.
///
/// On top of the generator's checkmate and stalemate detection this tracks
/// the halfmove clock, fullmove number and position repetitions so that
/// draws by rule are reported too.
#[derive(Debug, Clone)]
pub struct ChessRules {
    initial: Board,
    initial_halfmove: u32,
    initial_fullmove: u32,
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    repetitions: HashMap<u64, u32>,
}

impl ChessRules {
    /// Rules starting from the standard initial position.
    #[instrument]
    pub fn new() -> Self {
        Self::from_board(Board::default(), 0, 1)
    }

    /// Rules starting from an arbitrary position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if the board part of the encoding is not
    /// a valid chess position.
    #[instrument(skip(position), fields(fen = %position))]
    pub fn from_position(position: &Position) -> Result<Self, PositionError> {
        let board = Board::from_str(position.encoding()).map_err(|e| {
            warn!(error = %e, "Rejected FEN");
            PositionError::new(format!("Invalid position '{}': {}", position, e))
        })?;
        Ok(Self::from_board(
            board,
            position.halfmove_clock(),
            position.fullmove_number(),
        ))
    }

    fn from_board(board: Board, halfmove: u32, fullmove: u32) -> Self {
        let mut repetitions = HashMap::new();
        repetitions.insert(board.get_hash(), 1);
        Self {
            initial: board,
            initial_halfmove: halfmove,
            initial_fullmove: fullmove,
            board,
            halfmove_clock: halfmove,
            fullmove_number: fullmove,
            repetitions,
        }
    }

    fn verbose(&self, chess_move: ChessMove) -> Option<LegalMove> {
        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let piece = piece_kind(self.board.piece_on(source)?);
        let side = side_of(self.board.side_to_move());

        let file_delta = source.get_file().to_index().abs_diff(dest.get_file().to_index());
        let captured = match self.board.piece_on(dest) {
            Some(target) => Some(piece_kind(target)),
            // A pawn changing file onto an empty square takes en passant.
            None if piece == PieceKind::Pawn && file_delta == 1 => Some(PieceKind::Pawn),
            None => None,
        };
        let castle = piece == PieceKind::King && file_delta == 2;

        let mv = Move::new(
            side,
            square_of(source),
            square_of(dest),
            chess_move.get_promotion().map(piece_kind),
        );
        Some(LegalMove::new(mv, piece, captured, castle))
    }

    fn insufficient_material(&self) -> bool {
        let count = |piece: Piece| self.board.pieces(piece).popcnt();
        let heavy = count(Piece::Pawn) + count(Piece::Rook) + count(Piece::Queen);
        if heavy > 0 {
            return false;
        }
        if count(Piece::Knight) + count(Piece::Bishop) <= 1 {
            return true;
        }
        // Any number of bishops confined to one square colour cannot mate.
        let mut colours = (*self.board.pieces(Piece::Bishop))
            .map(|square| (square.get_file().to_index() + square.get_rank().to_index()) % 2);
        let first = colours.next();
        count(Piece::Knight) == 0 && colours.all(|colour| Some(colour) == first)
    }

    fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.board.get_hash())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl LegalMoveProvider for ChessRules {
    fn position(&self) -> Position {
        let fen = self.board.to_string();
        let placement: Vec<&str> = fen.split_whitespace().take(4).collect();
        Position::from_parts(
            format!(
                "{} {} {}",
                placement.join(" "),
                self.halfmove_clock,
                self.fullmove_number
            ),
            self.turn(),
        )
    }

    fn turn(&self) -> Side {
        side_of(self.board.side_to_move())
    }

    fn legal_moves(&self) -> Vec<LegalMove> {
        MoveGen::new_legal(&self.board)
            .filter_map(|m| self.verbose(m))
            .collect()
    }

    fn status(&self) -> GameState {
        match self.board.status() {
            BoardStatus::Checkmate => GameState::Terminal(TerminationReason::Checkmate),
            BoardStatus::Stalemate => GameState::Terminal(TerminationReason::Stalemate),
            BoardStatus::Ongoing => {
                let rule = if self.insufficient_material() {
                    Some(DrawRule::InsufficientMaterial)
                } else if self.repetition_count() >= REPETITION_LIMIT {
                    Some(DrawRule::ThreefoldRepetition)
                } else if self.halfmove_clock >= FIFTY_MOVE_PLIES {
                    Some(DrawRule::FiftyMove)
                } else {
                    None
                };
                match rule {
                    Some(rule) => GameState::Terminal(TerminationReason::DrawByRule(rule)),
                    None => GameState::InProgress,
                }
            }
        }
    }

    #[instrument(skip(self, mv), fields(mv = %mv))]
    fn play(&mut self, mv: &Move) -> Result<LegalMove, IllegalMoveError> {
        let to_move = self.turn();
        if mv.side != to_move {
            return Err(IllegalMoveError::WrongTurn {
                side: mv.side,
                to_move,
            });
        }

        let chess_move = ChessMove::new(
            chess_square(mv.from),
            chess_square(mv.to),
            mv.promotion.map(chess_piece),
        );
        if !self.board.legal(chess_move) {
            return Err(IllegalMoveError::NotLegal(*mv));
        }
        let legal = self
            .verbose(chess_move)
            .ok_or(IllegalMoveError::NotLegal(*mv))?;

        self.board = self.board.make_move_new(chess_move);

        if legal.piece() == PieceKind::Pawn || legal.captured().is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if to_move == Side::Black {
            self.fullmove_number += 1;
        }
        *self.repetitions.entry(self.board.get_hash()).or_insert(0) += 1;

        debug!(
            halfmove_clock = self.halfmove_clock,
            fullmove_number = self.fullmove_number,
            "Move played"
        );
        Ok(legal)
    }

    #[instrument(skip(self))]
    fn reset(&mut self) {
        *self = Self::from_board(self.initial, self.initial_halfmove, self.initial_fullmove);
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn piece_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

fn chess_piece(kind: PieceKind) -> Piece {
    match kind {
        PieceKind::Pawn => Piece::Pawn,
        PieceKind::Knight => Piece::Knight,
        PieceKind::Bishop => Piece::Bishop,
        PieceKind::Rook => Piece::Rook,
        PieceKind::Queen => Piece::Queen,
        PieceKind::King => Piece::King,
    }
}

fn square_of(square: chess::Square) -> Square {
    Square::from_index(square.to_index())
}

fn chess_square(square: Square) -> chess::Square {
    chess::Square::make_square(
        Rank::from_index(square.rank() as usize),
        File::from_index(square.file() as usize),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(rules: &mut ChessRules, text: &str) {
        let side = rules.turn();
        let mv = Move::from_coordinate(text, side).unwrap();
        rules.play(&mv).unwrap();
    }

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let rules = ChessRules::new();
        assert_eq!(rules.legal_moves().len(), 20);
        assert_eq!(rules.turn(), Side::White);
        assert_eq!(rules.status(), GameState::InProgress);
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let mut rules = ChessRules::new();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut rules, text);
        }
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::Checkmate)
        );
        assert!(rules.legal_moves().is_empty());
    }

    #[test]
    fn test_stalemate_detected() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let rules = ChessRules::from_position(&position).unwrap();
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::Stalemate)
        );
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let position = Position::from_fen("8/8/8/4k3/8/8/3NK3/8 w - - 0 1").unwrap();
        let rules = ChessRules::from_position(&position).unwrap();
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::DrawByRule(
                DrawRule::InsufficientMaterial
            ))
        );
    }

    #[test]
    fn test_same_colour_bishops_are_insufficient() {
        let position = Position::from_fen("8/8/3kb3/8/8/3B4/4K3/8 w - - 0 1").unwrap();
        let rules = ChessRules::from_position(&position).unwrap();
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::DrawByRule(
                DrawRule::InsufficientMaterial
            ))
        );
    }

    #[test]
    fn test_opposite_colour_bishops_play_on() {
        let position = Position::from_fen("8/8/3k1b2/8/8/3B4/4K3/8 w - - 0 1").unwrap();
        let rules = ChessRules::from_position(&position).unwrap();
        assert_eq!(rules.status(), GameState::InProgress);
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut rules = ChessRules::new();
        for text in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"] {
            play(&mut rules, text);
            assert_eq!(rules.status(), GameState::InProgress);
        }
        play(&mut rules, "f6g8");
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::DrawByRule(
                DrawRule::ThreefoldRepetition
            ))
        );
    }

    #[test]
    fn test_fifty_move_rule() {
        let position = Position::from_fen("4k3/8/8/8/8/8/R7/4K3 w - - 99 80").unwrap();
        let mut rules = ChessRules::from_position(&position).unwrap();
        assert_eq!(rules.status(), GameState::InProgress);
        play(&mut rules, "a2a3");
        assert_eq!(
            rules.status(),
            GameState::Terminal(TerminationReason::DrawByRule(DrawRule::FiftyMove))
        );
    }

    #[test]
    fn test_clocks_tracked_in_encoding() {
        let mut rules = ChessRules::new();
        play(&mut rules, "g1f3");
        play(&mut rules, "e7e5");
        let position = rules.position();
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 2);
        play(&mut rules, "b1c3");
        assert_eq!(rules.position().halfmove_clock(), 1);
    }

    #[test]
    fn test_en_passant_reported_as_capture() {
        let mut rules = ChessRules::new();
        for text in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            play(&mut rules, text);
        }
        let ep = rules
            .legal_moves()
            .into_iter()
            .find(|m| m.mv().coordinate() == "e5d6")
            .expect("en passant should be legal");
        assert_eq!(ep.captured(), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_illegal_move_rejected_without_change() {
        let mut rules = ChessRules::new();
        let before = rules.position();
        let mv = Move::from_coordinate("e2e5", Side::White).unwrap();
        assert_eq!(rules.play(&mv), Err(IllegalMoveError::NotLegal(mv)));
        assert_eq!(rules.position(), before);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut rules = ChessRules::new();
        let initial = rules.position();
        play(&mut rules, "e2e4");
        rules.reset();
        assert_eq!(rules.position(), initial);
        assert_eq!(rules.legal_moves().len(), 20);
    }
}
