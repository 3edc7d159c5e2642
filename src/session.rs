//! Single-player game sessions and the opponent turn lock.

use crate::opponent::{OpponentRequest, Style};
use crate::report::OutcomeReport;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_chess::{
    GameOutcome, GameStateMachine, IllegalMoveError, Move, MoveRecord, OutcomeEvaluator,
    PieceKind, PlayerResult, Side,
};
use tracing::{debug, info, instrument, warn};

/// The human player's identity.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct PlayerProfile {
    /// Name shown on the leaderboard.
    name: String,
}

/// Permission to resolve one opponent move for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentTicket {
    generation: u64,
    request: OpponentRequest,
}

impl OpponentTicket {
    /// Generation the ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The request to resolve.
    pub fn request(&self) -> &OpponentRequest {
        &self.request
    }

    /// Splits the ticket into its request.
    pub fn into_request(self) -> OpponentRequest {
        self.request
    }
}

/// What happened to a resolved opponent move.
#[derive(Debug, Clone, PartialEq)]
pub enum OpponentApplied {
    /// The move was applied.
    Applied(MoveRecord),
    /// The ticket belonged to an earlier generation; nothing changed.
    Stale,
}

/// One human-versus-opponent game.
///
/// All moves go through the owned [`GameStateMachine`]. Human input is
/// accepted only on the human's turn while no opponent move is pending.
#[derive(Debug)]
pub struct GameSession {
    machine: GameStateMachine,
    profile: PlayerProfile,
    style: Style,
    human: Side,
    generation: u64,
    pending: Option<u64>,
    outcome: Option<GameOutcome>,
}

impl GameSession {
    /// Creates a session over an existing machine.
    #[instrument(skip(machine, profile), fields(player = %profile.name()))]
    pub fn new(machine: GameStateMachine, profile: PlayerProfile, style: Style, human: Side) -> Self {
        info!("Starting game session");
        let outcome = OutcomeEvaluator::evaluate_machine(&machine);
        Self {
            machine,
            profile,
            style,
            human,
            generation: 0,
            pending: None,
            outcome,
        }
    }

    /// Standard game from the starting position.
    pub fn standard(profile: PlayerProfile, style: Style, human: Side) -> Self {
        Self::new(GameStateMachine::standard(), profile, style, human)
    }

    /// The game-state machine.
    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    /// Player profile.
    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Opponent style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Side the human plays.
    pub fn human_side(&self) -> Side {
        self.human
    }

    /// Current generation. Bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether an opponent move is outstanding.
    pub fn is_awaiting_opponent(&self) -> bool {
        self.pending.is_some()
    }

    /// Final outcome once the game is over.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Report for the leaderboard once the game is over.
    pub fn report(&self) -> Option<OutcomeReport> {
        self.outcome.map(|outcome| {
            OutcomeReport::new(
                self.profile.name().clone(),
                self.style,
                PlayerResult::for_side(&outcome, self.human),
            )
        })
    }

    /// Whether the opponent should be asked for a move now.
    pub fn opponent_due(&self) -> bool {
        !self.machine.is_terminal()
            && self.pending.is_none()
            && self.machine.turn() == self.human.opponent()
    }

    /// Applies a coordinate move typed by the human.
    ///
    /// A pawn move to the last rank without a promotion letter promotes to a
    /// queen.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if the game is over, the opponent is on
    /// move or being resolved, the text does not decode, or the move is not
    /// legal. The session is unchanged on error.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn human_move(&mut self, input: &str) -> Result<MoveRecord, IllegalMoveError> {
        if let Some(reason) = self.machine.state().reason() {
            return Err(IllegalMoveError::GameOver(reason));
        }
        if self.pending.is_some() {
            return Err(IllegalMoveError::AwaitingOpponent);
        }
        let to_move = self.machine.turn();
        if to_move != self.human {
            return Err(IllegalMoveError::WrongTurn {
                side: self.human,
                to_move,
            });
        }

        let mv = Move::from_coordinate(input, self.human).map_err(|reason| {
            IllegalMoveError::Unparseable {
                input: input.to_string(),
                reason,
            }
        })?;
        let mv = self.with_default_promotion(mv);

        let record = self.machine.apply_move(mv)?;
        self.refresh_outcome();
        Ok(record)
    }

    fn with_default_promotion(&self, mv: Move) -> Move {
        if mv.promotion.is_some() || self.machine.find_legal(&mv).is_some() {
            return mv;
        }
        let queen = mv.with_promotion(PieceKind::Queen);
        if self.machine.find_legal(&queen).is_some() {
            debug!(mv = %queen, "Promoting to queen by default");
            queen
        } else {
            mv
        }
    }

    /// Locks the turn and issues a ticket if the opponent is due.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn begin_opponent_turn(&mut self) -> Option<OpponentTicket> {
        if !self.opponent_due() {
            return None;
        }
        let request = OpponentRequest::from_machine(&self.machine, self.style, self.generation)?;
        self.pending = Some(self.generation);
        debug!(legal = request.legal_moves().len(), "Opponent turn started");
        Some(OpponentTicket {
            generation: self.generation,
            request,
        })
    }

    /// Applies a resolved opponent move if its ticket is still current.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if a current-generation move is rejected
    /// by the machine. The turn lock is released either way.
    #[instrument(skip(self, mv), fields(current = self.generation, mv = %mv))]
    pub fn complete_opponent_turn(
        &mut self,
        generation: u64,
        mv: Move,
    ) -> Result<OpponentApplied, IllegalMoveError> {
        if generation != self.generation || self.pending != Some(generation) {
            warn!(generation, "Discarding stale opponent move");
            return Ok(OpponentApplied::Stale);
        }
        self.pending = None;
        let record = self.machine.apply_move(mv)?;
        self.refresh_outcome();
        Ok(OpponentApplied::Applied(record))
    }

    /// Starts over from the initial position. Outstanding tickets go stale.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.machine.reset();
        self.outcome = OutcomeEvaluator::evaluate_machine(&self.machine);
        info!(generation = self.generation, "Session reset");
    }

    fn refresh_outcome(&mut self) {
        self.outcome = OutcomeEvaluator::evaluate_machine(&self.machine);
        if let Some(outcome) = self.outcome {
            info!(%outcome, "Game finished");
        }
    }
}
