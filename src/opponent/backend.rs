//! Opponent backends: the seams between the resolver and the outside world.

use super::request::OpponentRequest;
use derive_more::{Display, Error};
use strictly_chess::Position;
use tracing::instrument;

/// A search engine that answers "best move from here".
#[async_trait::async_trait]
pub trait EngineClient: Send + std::fmt::Debug {
    /// Returns the engine's reply move text for `position`.
    async fn best_move(&mut self, position: &Position, depth: u32) -> Result<String, BackendError>;
}

/// A generative model that proposes a move from a described position.
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync + std::fmt::Debug {
    /// Returns the model's raw reply for `request`.
    async fn propose(&self, request: &OpponentRequest) -> Result<String, BackendError>;
}

/// Backend chosen once per session.
#[derive(Debug)]
pub enum OpponentBackend {
    /// UCI engine. One query per turn, verified but not retried.
    Engine {
        /// Engine connection.
        client: Box<dyn EngineClient>,
        /// Search depth.
        depth: u32,
    },
    /// Generative model. Retried up to the policy's attempt budget.
    Generative {
        /// Model connection.
        client: Box<dyn GenerativeClient>,
    },
}

impl OpponentBackend {
    /// Label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OpponentBackend::Engine { .. } => "engine",
            OpponentBackend::Generative { .. } => "generative",
        }
    }
}

/// Backend transport or protocol error.
#[derive(Debug, Clone, Display, Error)]
#[display("Backend error: {} at {}:{}", message, file, line)]
pub struct BackendError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackendError {
    /// Creates a new backend error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for BackendError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<crate::llm_client::LlmError> for BackendError {
    #[track_caller]
    fn from(err: crate::llm_client::LlmError) -> Self {
        Self::new(err.message)
    }
}
