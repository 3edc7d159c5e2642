//! Strictly Chess Arena - human versus engine or LLM chess
//!
//! This library runs single-player chess sessions against a UCI engine or a
//! generative model, on top of the `strictly_chess` game-state machine.
//!
//! # Architecture
//!
//! - **Opponent**: [`OpponentMoveResolver`] turns any backend reply into a legal move
//!   (retry, verify, random fallback)
//! - **Session**: [`GameSession`] holds the explicit player/style/side context and the turn lock
//! - **Orchestrator**: [`Orchestrator`] drives a session from commands over channels
//! - **Report**: [`ResultReporter`] merges finished games into a leaderboard
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_chess::Side;
//! use strictly_chess_arena::{
//!     GameSession, MemoryReporter, OpponentBackend, OpponentMoveResolver, Orchestrator,
//!     PlayerProfile, RetryPolicy, Style, UciEngine,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = UciEngine::spawn(&["stockfish".to_string()])?;
//! let backend = OpponentBackend::Engine { client: Box::new(engine), depth: 15 };
//! let resolver = OpponentMoveResolver::new(backend, RetryPolicy::default());
//! let session = GameSession::standard(PlayerProfile::new("Ada".into()), Style::Balanced, Side::White);
//!
//! let (event_tx, _event_rx) = tokio::sync::mpsc::unbounded_channel();
//! let (_command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
//! let orchestrator = Orchestrator::new(session, resolver, Arc::new(MemoryReporter::new()), event_tx);
//! orchestrator.run(command_rx).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod llm_client;
mod opponent;
mod orchestrator;
mod report;
mod session;

// Crate-level exports - Configuration
pub use config::{
    ArenaConfig, BackendKind, ConfigError, EngineSection, LlmSection, ResolverSection,
};

// Crate-level exports - LLM client
pub use llm_client::{ChatPrompt, LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Opponent resolution
pub use opponent::{
    AttemptError, BackendError, EngineClient, GenerativeClient, LlmOpponent, MoveSource,
    OpponentBackend, OpponentMoveResolver, OpponentRequest, Resolution, RetryPolicy, Style,
    UciEngine, build_prompt,
};

// Crate-level exports - Sessions and orchestration
pub use orchestrator::{Command, GameEvent, Orchestrator};
pub use session::{GameSession, OpponentApplied, OpponentTicket, PlayerProfile};

// Crate-level exports - Result reporting
pub use report::{
    LeaderboardEntry, MemoryReporter, OutcomeReport, PersistenceError, ResultReporter,
    SqliteReporter,
};
