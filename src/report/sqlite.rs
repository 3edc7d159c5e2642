//! SQLite-backed leaderboard.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::report::models::{LeaderboardChanges, LeaderboardRow};
use crate::report::{LeaderboardEntry, OutcomeReport, PersistenceError, ResultReporter, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Leaderboard stored in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteReporter {
    db_path: String,
}

impl SqliteReporter {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the database cannot be opened or
    /// migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, PersistenceError> {
        let reporter = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = reporter.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| PersistenceError::new(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Leaderboard database ready");
        Ok(reporter)
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, PersistenceError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            PersistenceError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })
    }
}

impl ResultReporter for SqliteReporter {
    #[instrument(skip(self, report), fields(player = %report.player(), result = %report.result()))]
    fn persist(&self, report: &OutcomeReport) -> Result<LeaderboardEntry, PersistenceError> {
        let mut conn = self.connection()?;

        let entry = conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
            let existing = schema::leaderboard::table
                .find(report.player())
                .select(LeaderboardRow::as_select())
                .first(conn)
                .optional()?;

            let is_new = existing.is_none();
            let mut entry = match existing {
                Some(row) => LeaderboardEntry::try_from(row)?,
                None => LeaderboardEntry::empty(report.player().clone(), *report.style()),
            };
            entry.record(report);

            let changes = LeaderboardChanges::from(&entry);
            if is_new {
                diesel::insert_into(schema::leaderboard::table)
                    .values(&changes)
                    .execute(conn)?;
            } else {
                diesel::update(schema::leaderboard::table.find(report.player()))
                    .set(&changes)
                    .execute(conn)?;
            }
            Ok(entry)
        })?;

        info!(
            games = entry.games(),
            wins = entry.wins(),
            losses = entry.losses(),
            "Result persisted"
        );
        Ok(entry)
    }

    #[instrument(skip(self))]
    fn top_by_wins(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let mut conn = self.connection()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = schema::leaderboard::table
            .order((
                schema::leaderboard::wins.desc(),
                schema::leaderboard::name.asc(),
            ))
            .limit(limit)
            .select(LeaderboardRow::as_select())
            .load(&mut conn)?;

        debug!(count = rows.len(), "Leaderboard loaded");
        rows.into_iter().map(LeaderboardEntry::try_from).collect()
    }
}
