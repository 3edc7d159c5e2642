//! Persistence error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Leaderboard persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Persistence error: {} at {}:{}", message, file, line)]
pub struct PersistenceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PersistenceError {
    /// Creates a new persistence error with caller location tracking.
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

impl From<diesel::result::Error> for PersistenceError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}

impl From<tokio::task::JoinError> for PersistenceError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(format!("Persistence task failed: {}", err))
    }
}

impl<T> From<std::sync::PoisonError<T>> for PersistenceError {
    #[track_caller]
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::new("Leaderboard lock poisoned")
    }
}
