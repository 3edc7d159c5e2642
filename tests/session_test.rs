//! Tests for game sessions: turn lock, generations and promotion defaults.

use strictly_chess::{
    GameStateMachine, IllegalMoveError, Move, PieceKind, PlayerResult, Position, Side,
};
use strictly_chess_arena::{GameSession, OpponentApplied, PlayerProfile, Style};

fn session(human: Side) -> GameSession {
    GameSession::standard(PlayerProfile::new("Ada".to_string()), Style::Aggressive, human)
}

fn opponent_move(session: &mut GameSession, text: &str) -> OpponentApplied {
    let ticket = session.begin_opponent_turn().expect("opponent should be due");
    let mv = Move::from_coordinate(text, ticket.request().side()).unwrap();
    session
        .complete_opponent_turn(ticket.generation(), mv)
        .unwrap()
}

#[test]
fn test_stale_reply_after_reset_is_discarded() {
    let mut session = session(Side::White);
    session.human_move("e2e4").unwrap();
    let ticket = session.begin_opponent_turn().unwrap();
    assert_eq!(ticket.generation(), 0);

    session.reset();
    assert_eq!(session.generation(), 1);
    assert!(!session.is_awaiting_opponent());

    let late = Move::from_coordinate("e7e5", Side::Black).unwrap();
    let applied = session.complete_opponent_turn(ticket.generation(), late).unwrap();
    assert_eq!(applied, OpponentApplied::Stale);
    assert!(session.machine().history().is_empty());
    assert_eq!(session.machine().turn(), Side::White);
}

#[test]
fn test_ticket_request_matches_position() {
    let mut session = session(Side::White);
    session.human_move("d2d4").unwrap();
    let ticket = session.begin_opponent_turn().unwrap();

    let request = ticket.request();
    assert_eq!(request.side(), Side::Black);
    assert_eq!(request.style(), Style::Aggressive);
    assert_eq!(request.position(), &session.machine().position());
    assert_eq!(request.legal_moves().len(), 20);
}

#[test]
fn test_turn_lock_released_after_reply() {
    let mut session = session(Side::White);
    session.human_move("e2e4").unwrap();
    let applied = opponent_move(&mut session, "c7c5");
    assert!(matches!(applied, OpponentApplied::Applied(_)));
    assert!(!session.is_awaiting_opponent());
    assert!(session.human_move("g1f3").is_ok());
}

#[test]
fn test_last_rank_pawn_defaults_to_queen() {
    let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let machine = GameStateMachine::from_position(&position).unwrap();
    let mut session = GameSession::new(
        machine,
        PlayerProfile::new("Ada".to_string()),
        Style::Balanced,
        Side::White,
    );

    let record = session.human_move("a7a8").unwrap();
    assert_eq!(record.mv().promotion, Some(PieceKind::Queen));
}

#[test]
fn test_explicit_underpromotion_is_kept() {
    let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let machine = GameStateMachine::from_position(&position).unwrap();
    let mut session = GameSession::new(
        machine,
        PlayerProfile::new("Ada".to_string()),
        Style::Balanced,
        Side::White,
    );

    let record = session.human_move("a7a8n").unwrap();
    assert_eq!(record.mv().promotion, Some(PieceKind::Knight));
}

#[test]
fn test_losing_as_white_reports_loss() {
    let mut session = session(Side::White);
    session.human_move("f2f3").unwrap();
    opponent_move(&mut session, "e7e5");
    session.human_move("g2g4").unwrap();
    opponent_move(&mut session, "d8h4");

    let outcome = session.outcome().unwrap();
    assert_eq!(outcome.winner(), Some(Side::Black));
    let report = session.report().unwrap();
    assert_eq!(report.player(), "Ada");
    assert_eq!(*report.style(), Style::Aggressive);
    assert_eq!(*report.result(), PlayerResult::Loss);

    assert!(session.begin_opponent_turn().is_none());
    assert!(matches!(
        session.human_move("e1f2"),
        Err(IllegalMoveError::GameOver(_))
    ));
}

#[test]
fn test_winning_as_black_reports_win() {
    let mut session = session(Side::Black);
    opponent_move(&mut session, "f2f3");
    session.human_move("e7e5").unwrap();
    opponent_move(&mut session, "g2g4");
    session.human_move("d8h4").unwrap();

    let report = session.report().unwrap();
    assert_eq!(*report.result(), PlayerResult::Win);
}

#[test]
fn test_reset_after_game_over_clears_outcome() {
    let mut session = session(Side::Black);
    opponent_move(&mut session, "f2f3");
    session.human_move("e7e5").unwrap();
    opponent_move(&mut session, "g2g4");
    session.human_move("d8h4").unwrap();
    assert!(session.outcome().is_some());

    session.reset();
    assert!(session.outcome().is_none());
    assert!(session.report().is_none());
    assert!(session.opponent_due());
}
