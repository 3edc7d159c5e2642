//! Tests for the asynchronous orchestrator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strictly_chess::{PlayerResult, Side};
use strictly_chess_arena::{
    BackendError, Command, GameEvent, GameSession, GenerativeClient, LeaderboardEntry,
    MemoryReporter, OpponentBackend, OpponentMoveResolver, OpponentRequest, Orchestrator,
    OutcomeReport, PersistenceError, PlayerProfile, ResultReporter, RetryPolicy, Style,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Plays scripted replies; once the script runs out, the first legal move.
#[derive(Debug, Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeClient for ScriptedModel {
    async fn propose(&self, request: &OpponentRequest) -> Result<String, BackendError> {
        let scripted = self.replies.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| request.legal_coordinates()[0].clone()))
    }
}

/// Never replies within the test.
#[derive(Debug)]
struct HangingModel;

#[async_trait::async_trait]
impl GenerativeClient for HangingModel {
    async fn propose(&self, _request: &OpponentRequest) -> Result<String, BackendError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(BackendError::new("unreachable"))
    }
}

struct Harness {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<GameEvent>,
    task: JoinHandle<anyhow::Result<GameSession>>,
}

impl Harness {
    fn start(
        model: impl GenerativeClient + 'static,
        human: Side,
        reporter: Arc<dyn ResultReporter>,
    ) -> Self {
        let backend = OpponentBackend::Generative {
            client: Box::new(model),
        };
        let resolver =
            OpponentMoveResolver::new(backend, RetryPolicy::new(3, Duration::from_secs(3600)))
                .with_seed(3);
        let session =
            GameSession::standard(PlayerProfile::new("Ada".to_string()), Style::Defensive, human);
        let (event_tx, events) = mpsc::unbounded_channel();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(session, resolver, reporter, event_tx);
        let task = tokio::spawn(orchestrator.run(command_rx));
        Self {
            commands,
            events,
            task,
        }
    }

    async fn next(&mut self) -> GameEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    fn send(&self, command: Command) {
        self.commands.send(command).unwrap();
    }

    async fn quit(self) -> GameSession {
        self.send(Command::Quit);
        self.task.await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn test_human_move_then_opponent_reply() {
    let mut harness = Harness::start(
        ScriptedModel::new(&["e7e5"]),
        Side::White,
        Arc::new(MemoryReporter::new()),
    );
    assert!(matches!(harness.next().await, GameEvent::Started { generation: 0, .. }));

    harness.send(Command::Move("e2e4".to_string()));
    match harness.next().await {
        GameEvent::HumanMoved(record) => assert_eq!(record.mover(), Side::White),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(harness.next().await, GameEvent::OpponentThinking { .. }));
    match harness.next().await {
        GameEvent::OpponentMoved { record, resolution } => {
            assert_eq!(record.mover(), Side::Black);
            assert_eq!(resolution.mv().coordinate(), "e7e5");
            assert!(!resolution.is_fallback());
        }
        other => panic!("unexpected event {:?}", other),
    }

    let session = harness.quit().await;
    assert_eq!(session.machine().history().len(), 2);
}

#[tokio::test]
async fn test_opponent_opens_when_human_is_black() {
    let mut harness = Harness::start(
        ScriptedModel::new(&["d2d4"]),
        Side::Black,
        Arc::new(MemoryReporter::new()),
    );
    assert!(matches!(harness.next().await, GameEvent::Started { human: Side::Black, .. }));
    assert!(matches!(harness.next().await, GameEvent::OpponentThinking { .. }));
    assert!(matches!(harness.next().await, GameEvent::OpponentMoved { .. }));

    let session = harness.quit().await;
    assert_eq!(session.machine().turn(), Side::Black);
}

#[tokio::test]
async fn test_rejected_input_reports_and_keeps_state() {
    let mut harness = Harness::start(
        ScriptedModel::default(),
        Side::White,
        Arc::new(MemoryReporter::new()),
    );
    harness.next().await;

    harness.send(Command::Move("e2e5".to_string()));
    match harness.next().await {
        GameEvent::MoveRejected { input, .. } => assert_eq!(input, "e2e5"),
        other => panic!("unexpected event {:?}", other),
    }
    harness.send(Command::Moves);
    match harness.next().await {
        GameEvent::LegalMoves(moves) => assert_eq!(moves.len(), 20),
        other => panic!("unexpected event {:?}", other),
    }

    let session = harness.quit().await;
    assert!(session.machine().history().is_empty());
}

#[tokio::test]
async fn test_game_over_persists_result() {
    let reporter = Arc::new(MemoryReporter::new());
    let mut harness = Harness::start(
        ScriptedModel::new(&["e7e5", "d8h4"]),
        Side::White,
        reporter.clone(),
    );
    harness.next().await;

    for human in ["f2f3", "g2g4"] {
        harness.send(Command::Move(human.to_string()));
        assert!(matches!(harness.next().await, GameEvent::HumanMoved(_)));
        assert!(matches!(harness.next().await, GameEvent::OpponentThinking { .. }));
        assert!(matches!(harness.next().await, GameEvent::OpponentMoved { .. }));
    }

    match harness.next().await {
        GameEvent::GameOver(outcome) => assert_eq!(outcome.winner(), Some(Side::Black)),
        other => panic!("unexpected event {:?}", other),
    }
    match harness.next().await {
        GameEvent::ResultSaved(entry) => {
            assert_eq!(*entry.games(), 1);
            assert_eq!(*entry.losses(), 1);
            assert_eq!(*entry.style(), Style::Defensive);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let session = harness.quit().await;
    assert_eq!(
        session.report().map(|r| *r.result()),
        Some(PlayerResult::Loss)
    );
    let top = reporter.top_by_wins(10).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name(), "Ada");
}

#[tokio::test]
async fn test_reset_abandons_pending_opponent_request() {
    let mut harness = Harness::start(HangingModel, Side::Black, Arc::new(MemoryReporter::new()));
    harness.next().await;
    assert!(matches!(
        harness.next().await,
        GameEvent::OpponentThinking { generation: 0 }
    ));

    harness.send(Command::Reset);
    assert!(matches!(harness.next().await, GameEvent::Started { generation: 1, .. }));
    assert!(matches!(
        harness.next().await,
        GameEvent::OpponentThinking { generation: 1 }
    ));

    let session = harness.quit().await;
    assert_eq!(session.generation(), 1);
    assert!(session.machine().history().is_empty());
}

/// Stores results after a delay.
#[derive(Debug, Default)]
struct SlowReporter {
    inner: MemoryReporter,
}

impl ResultReporter for SlowReporter {
    fn persist(&self, report: &OutcomeReport) -> Result<LeaderboardEntry, PersistenceError> {
        std::thread::sleep(Duration::from_millis(300));
        self.inner.persist(report)
    }

    fn top_by_wins(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        self.inner.top_by_wins(limit)
    }
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn test_run_future_is_send() {
    let backend = OpponentBackend::Generative {
        client: Box::new(ScriptedModel::default()),
    };
    let resolver = OpponentMoveResolver::new(backend, RetryPolicy::default());
    let session =
        GameSession::standard(PlayerProfile::new("Ada".to_string()), Style::Balanced, Side::White);
    let (event_tx, _events) = mpsc::unbounded_channel();
    let (_commands, command_rx) = mpsc::unbounded_channel();
    let orchestrator =
        Orchestrator::new(session, resolver, Arc::new(MemoryReporter::new()), event_tx);

    let run = orchestrator.run(command_rx);
    assert_send(&run);
}

#[tokio::test]
async fn test_reset_is_not_held_up_by_slow_store() {
    let reporter = Arc::new(SlowReporter::default());
    let mut harness = Harness::start(
        ScriptedModel::new(&["e7e5", "d8h4"]),
        Side::White,
        reporter.clone(),
    );
    harness.next().await;

    for human in ["f2f3", "g2g4"] {
        harness.send(Command::Move(human.to_string()));
        assert!(matches!(harness.next().await, GameEvent::HumanMoved(_)));
        assert!(matches!(harness.next().await, GameEvent::OpponentThinking { .. }));
        assert!(matches!(harness.next().await, GameEvent::OpponentMoved { .. }));
    }
    assert!(matches!(harness.next().await, GameEvent::GameOver(_)));

    harness.send(Command::Reset);
    assert!(matches!(harness.next().await, GameEvent::Started { generation: 1, .. }));
    match harness.next().await {
        GameEvent::ResultSaved(entry) => assert_eq!(*entry.losses(), 1),
        other => panic!("unexpected event {:?}", other),
    }

    let session = harness.quit().await;
    assert!(session.outcome().is_none());
    assert_eq!(reporter.top_by_wins(10).unwrap().len(), 1);
}
