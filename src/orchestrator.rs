//! Asynchronous game orchestration between a human and an opponent backend.

use crate::opponent::{OpponentMoveResolver, Resolution};
use crate::report::{LeaderboardEntry, PersistenceError, ResultReporter};
use crate::session::{GameSession, OpponentApplied};
use anyhow::Result;
use std::sync::Arc;
use strictly_chess::{GameOutcome, IllegalMoveError, MoveRecord, Position, Side};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Input from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A coordinate move typed by the human.
    Move(String),
    /// List the legal moves.
    Moves,
    /// Abandon the game and start over.
    Reset,
    /// Stop the orchestrator.
    Quit,
}

/// Messages sent from orchestrator to UI.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A game started (or restarted).
    Started {
        /// Starting position.
        position: Position,
        /// Side the human plays.
        human: Side,
        /// Session generation.
        generation: u64,
    },
    /// The human's move was applied.
    HumanMoved(MoveRecord),
    /// The human's input was rejected; nothing changed.
    MoveRejected {
        /// Raw input.
        input: String,
        /// Why it was rejected.
        error: IllegalMoveError,
    },
    /// The opponent is choosing a move.
    OpponentThinking {
        /// Generation of the outstanding request.
        generation: u64,
    },
    /// The opponent's move was applied.
    OpponentMoved {
        /// The applied move.
        record: MoveRecord,
        /// How the move was obtained.
        resolution: Resolution,
    },
    /// Legal moves in coordinate form.
    LegalMoves(Vec<String>),
    /// The game ended.
    GameOver(GameOutcome),
    /// The result was merged into the leaderboard.
    ResultSaved(LeaderboardEntry),
    /// The result could not be stored.
    PersistenceFailed(PersistenceError),
}

type Reply = (u64, Resolution);

/// Owns a [`GameSession`] and drives it from commands and opponent replies.
#[derive(Debug)]
pub struct Orchestrator {
    session: GameSession,
    resolver: Arc<Mutex<OpponentMoveResolver>>,
    reporter: Arc<dyn ResultReporter>,
    events: mpsc::UnboundedSender<GameEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl Orchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        session: GameSession,
        resolver: OpponentMoveResolver,
        reporter: Arc<dyn ResultReporter>,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        Self {
            session,
            resolver: Arc::new(Mutex::new(resolver)),
            reporter,
            events,
            in_flight: None,
        }
    }

    /// Runs until [`Command::Quit`] or the command channel closes, then
    /// returns the session.
    ///
    /// # Errors
    ///
    /// Fails if the event receiver has been dropped.
    #[instrument(skip_all, fields(player = %self.session.profile().name(), human = %self.session.human_side()))]
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) -> Result<GameSession> {
        info!("Starting game orchestration");
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Reply>();

        self.announce_start()?;
        self.advance(&reply_tx)?;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(Command::Move(input)) => self.human_move(input, &reply_tx)?,
                    Some(Command::Moves) => self.list_moves()?,
                    Some(Command::Reset) => self.reset(&reply_tx)?,
                },
                Some((generation, resolution)) = reply_rx.recv() => {
                    self.opponent_reply(generation, resolution, &reply_tx)?;
                }
            }
        }

        self.abort_in_flight();
        info!("Orchestration stopped");
        Ok(self.session)
    }

    fn emit(&self, event: GameEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    fn announce_start(&self) -> Result<()> {
        self.emit(GameEvent::Started {
            position: self.session.machine().position(),
            human: self.session.human_side(),
            generation: self.session.generation(),
        })
    }

    fn list_moves(&self) -> Result<()> {
        let moves = self
            .session
            .machine()
            .legal_moves()
            .iter()
            .map(|legal| legal.mv().coordinate())
            .collect();
        self.emit(GameEvent::LegalMoves(moves))
    }

    #[instrument(skip(self, reply_tx))]
    fn human_move(&mut self, input: String, reply_tx: &mpsc::UnboundedSender<Reply>) -> Result<()> {
        match self.session.human_move(&input) {
            Ok(record) => {
                self.emit(GameEvent::HumanMoved(record))?;
                self.advance(reply_tx)
            }
            Err(error) => {
                debug!(%error, "Human move rejected");
                self.emit(GameEvent::MoveRejected { input, error })
            }
        }
    }

    #[instrument(skip(self, resolution, reply_tx), fields(mv = %resolution.mv(), source = %resolution.source()))]
    fn opponent_reply(
        &mut self,
        generation: u64,
        resolution: Resolution,
        reply_tx: &mpsc::UnboundedSender<Reply>,
    ) -> Result<()> {
        match self.session.complete_opponent_turn(generation, resolution.mv()) {
            Ok(OpponentApplied::Applied(record)) => {
                self.in_flight = None;
                self.emit(GameEvent::OpponentMoved { record, resolution })?;
                self.advance(reply_tx)
            }
            Ok(OpponentApplied::Stale) => Ok(()),
            Err(error) => {
                error!(%error, "Resolved opponent move rejected by the game");
                self.in_flight = None;
                self.advance(reply_tx)
            }
        }
    }

    #[instrument(skip(self, reply_tx))]
    fn reset(&mut self, reply_tx: &mpsc::UnboundedSender<Reply>) -> Result<()> {
        self.abort_in_flight();
        self.session.reset();
        self.announce_start()?;
        self.advance(reply_tx)
    }

    /// Dispatches the opponent if due, or reports the result if the game
    /// just ended.
    fn advance(&mut self, reply_tx: &mpsc::UnboundedSender<Reply>) -> Result<()> {
        if let Some(outcome) = self.session.outcome() {
            self.emit(GameEvent::GameOver(outcome))?;
            self.persist_result();
            return Ok(());
        }

        let Some(ticket) = self.session.begin_opponent_turn() else {
            return Ok(());
        };
        let generation = ticket.generation();
        self.emit(GameEvent::OpponentThinking { generation })?;

        let resolver = Arc::clone(&self.resolver);
        let reply_tx = reply_tx.clone();
        let request = ticket.into_request();
        self.in_flight = Some(tokio::spawn(async move {
            let resolution = resolver.lock().await.resolve(&request).await;
            if reply_tx.send((generation, resolution)).is_err() {
                debug!(generation, "Orchestrator gone before opponent replied");
            }
        }));
        Ok(())
    }

    /// Stores the finished game in the background; the outcome is reported
    /// on the event channel when the store answers.
    fn persist_result(&self) {
        let Some(report) = self.session.report() else {
            return;
        };
        let reporter = Arc::clone(&self.reporter);
        let events = self.events.clone();
        tokio::spawn(async move {
            let saved = tokio::task::spawn_blocking(move || reporter.persist(&report))
                .await
                .map_err(PersistenceError::from)
                .and_then(|result| result);

            let event = match saved {
                Ok(entry) => GameEvent::ResultSaved(entry),
                Err(error) => {
                    error!(%error, "Failed to persist result");
                    GameEvent::PersistenceFailed(error)
                }
            };
            if events.send(event).is_err() {
                debug!("Event receiver gone before result was stored");
            }
        });
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            warn!("Aborting in-flight opponent request");
            task.abort();
        }
    }
}
