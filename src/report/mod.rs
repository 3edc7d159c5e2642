//! Result reporting: per-player leaderboard aggregates.

mod error;
mod memory;
mod models;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::PersistenceError;
pub use memory::MemoryReporter;
pub use models::{LeaderboardEntry, OutcomeReport};
pub use sqlite::SqliteReporter;

/// Sink for finished-game reports.
///
/// Implementations are blocking; async callers run them on a blocking task.
pub trait ResultReporter: Send + Sync + std::fmt::Debug {
    /// Merges `report` into the player's aggregate and returns the updated
    /// entry. Repeated calls accumulate.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be updated.
    fn persist(&self, report: &OutcomeReport) -> Result<LeaderboardEntry, PersistenceError>;

    /// Up to `limit` entries, most wins first, ties by name.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the store cannot be read.
    fn top_by_wins(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError>;
}
