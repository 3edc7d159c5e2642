//! In-process leaderboard used when no database is configured.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use crate::report::{LeaderboardEntry, OutcomeReport, PersistenceError, ResultReporter};

/// Leaderboard kept in a mutex-guarded map. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<HashMap<String, LeaderboardEntry>>,
}

impl MemoryReporter {
    /// Creates an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultReporter for MemoryReporter {
    #[instrument(skip(self, report), fields(player = %report.player(), result = %report.result()))]
    fn persist(&self, report: &OutcomeReport) -> Result<LeaderboardEntry, PersistenceError> {
        let mut entries = self.entries.lock()?;
        let entry = entries
            .entry(report.player().clone())
            .or_insert_with(|| LeaderboardEntry::empty(report.player().clone(), *report.style()));
        entry.record(report);
        debug!(games = entry.games(), "Result recorded in memory");
        Ok(entry.clone())
    }

    #[instrument(skip(self))]
    fn top_by_wins(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let entries = self.entries.lock()?;
        let mut ranked: Vec<LeaderboardEntry> = entries.values().cloned().collect();
        ranked.sort_by(|a, b| b.wins().cmp(a.wins()).then_with(|| a.name().cmp(b.name())));
        ranked.truncate(limit);
        Ok(ranked)
    }
}
