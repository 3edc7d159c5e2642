//! Tests for the chess game-state machine.

use std::collections::BTreeSet;
use strictly_chess::{
    ChessRules, GameState, GameStateMachine, IllegalMoveError, LegalMoveProvider, Move,
    OutcomeEvaluator, Position, Side, TerminationReason,
};

fn coordinates(moves: impl IntoIterator<Item = Move>) -> BTreeSet<String> {
    moves.into_iter().map(|mv| mv.coordinate()).collect()
}

fn play(machine: &mut GameStateMachine, text: &str) {
    let mv = Move::from_coordinate(text, machine.turn()).unwrap();
    machine.apply_move(mv).unwrap();
}

#[test]
fn test_opening_move_then_wrong_turn() {
    let mut machine = GameStateMachine::standard();

    let mv = Move::from_coordinate("e2e4", Side::White).unwrap();
    let record = machine.apply_move(mv).unwrap();
    assert_eq!(record.mover(), Side::White);
    assert_eq!(machine.turn(), Side::Black);

    let before = machine.position();
    let again = Move::from_coordinate("e2e4", Side::White).unwrap();
    assert_eq!(
        machine.apply_move(again),
        Err(IllegalMoveError::WrongTurn {
            side: Side::White,
            to_move: Side::Black,
        })
    );
    assert_eq!(machine.position(), before);
    assert_eq!(machine.history().len(), 1);
}

#[test]
fn test_legal_set_matches_fresh_rules_after_each_move() {
    let mut machine = GameStateMachine::standard();
    for text in ["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4"] {
        play(&mut machine, text);

        let fresh = ChessRules::from_position(&machine.position()).unwrap();
        assert_eq!(
            coordinates(machine.legal_moves().iter().map(|l| l.mv())),
            coordinates(fresh.legal_moves().iter().map(|l| l.mv())),
            "legal set drifted after {}",
            text
        );
    }
}

#[test]
fn test_human_plies_are_odd_when_human_is_white() {
    let mut machine = GameStateMachine::standard();
    let human = Side::White;
    for text in ["d2d4", "d7d5", "c2c4", "e7e6", "b1c3", "g8f6"] {
        play(&mut machine, text);
    }

    for record in machine.history() {
        assert_eq!(record.mover() == human, record.ply() % 2 == 1);
    }
}

#[test]
fn test_movers_follow_side_to_move_from_black_start() {
    let position =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    let mut machine = GameStateMachine::from_position(&position).unwrap();
    play(&mut machine, "e7e5");
    play(&mut machine, "g1f3");

    let movers: Vec<Side> = machine.history().iter().map(|r| r.mover()).collect();
    assert_eq!(movers, vec![Side::Black, Side::White]);
}

#[test]
fn test_reset_after_checkmate_restores_initial_position() {
    let mut machine = GameStateMachine::standard();
    let initial = machine.position();
    for text in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
        play(&mut machine, text);
    }
    assert_eq!(
        machine.state(),
        GameState::Terminal(TerminationReason::Checkmate)
    );
    let outcome = OutcomeEvaluator::evaluate_machine(&machine).unwrap();
    assert_eq!(outcome.winner(), Some(Side::White));

    machine.reset();
    assert_eq!(machine.position(), initial);
    assert!(machine.history().is_empty());
    assert_eq!(machine.state(), GameState::InProgress);
    assert_eq!(machine.legal_moves().len(), 20);
}

#[test]
fn test_promotion_requires_matching_piece() {
    let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let mut machine = GameStateMachine::from_position(&position).unwrap();

    let bare = Move::from_coordinate("a7a8", Side::White).unwrap();
    assert_eq!(machine.apply_move(bare), Err(IllegalMoveError::NotLegal(bare)));

    let knight = Move::from_coordinate("a7a8n", Side::White).unwrap();
    let record = machine.apply_move(knight).unwrap();
    assert!(record.legal_move().is_promotion());
    assert!(record.position().encoding().starts_with("N7/"));
}
