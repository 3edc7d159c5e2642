//! Leaderboard models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use strictly_chess::PlayerResult;
use tracing::instrument;

use crate::opponent::Style;
use crate::report::{PersistenceError, schema};

/// One finished game from the player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct OutcomeReport {
    /// Player name.
    player: String,
    /// Style the opponent played.
    style: Style,
    /// The player's result.
    result: PlayerResult,
}

/// Aggregated record for one player.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    name: String,
    games: u32,
    wins: u32,
    losses: u32,
    style: Style,
}

impl LeaderboardEntry {
    /// Entry for a player who has not played yet.
    pub fn empty(name: impl Into<String>, style: Style) -> Self {
        Self {
            name: name.into(),
            games: 0,
            wins: 0,
            losses: 0,
            style,
        }
    }

    /// Folds one report into the aggregate.
    #[instrument(skip(self, report), fields(player = %self.name, result = %report.result()))]
    pub fn record(&mut self, report: &OutcomeReport) {
        self.games += 1;
        match report.result() {
            PlayerResult::Win => self.wins += 1,
            PlayerResult::Loss => self.losses += 1,
            PlayerResult::Draw => {}
        }
        self.style = *report.style();
    }

    /// Games that were neither won nor lost.
    pub fn draws(&self) -> u32 {
        self.games.saturating_sub(self.wins + self.losses)
    }
}

impl std::fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<20} {:>5} {:>5} {:>5} {:>5}  {}",
            self.name,
            self.games,
            self.wins,
            self.losses,
            self.draws(),
            self.style
        )
    }
}

/// Leaderboard database row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::leaderboard)]
#[diesel(primary_key(name))]
pub(crate) struct LeaderboardRow {
    pub(crate) name: String,
    pub(crate) games: i32,
    pub(crate) wins: i32,
    pub(crate) losses: i32,
    pub(crate) style: String,
    #[allow(dead_code)]
    pub(crate) updated_at: NaiveDateTime,
}

/// Insertable or updatable leaderboard values.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::leaderboard)]
pub(crate) struct LeaderboardChanges {
    pub(crate) name: String,
    pub(crate) games: i32,
    pub(crate) wins: i32,
    pub(crate) losses: i32,
    pub(crate) style: String,
    pub(crate) updated_at: NaiveDateTime,
}

impl TryFrom<LeaderboardRow> for LeaderboardEntry {
    type Error = PersistenceError;

    #[track_caller]
    fn try_from(row: LeaderboardRow) -> Result<Self, Self::Error> {
        let style = row
            .style
            .parse::<Style>()
            .map_err(|_| PersistenceError::new(format!("Invalid style: '{}'", row.style)))?;
        let count = |value: i32, column: &str| {
            u32::try_from(value).map_err(|_| {
                PersistenceError::new(format!("Negative {} for '{}': {}", column, row.name, value))
            })
        };
        Ok(Self {
            games: count(row.games, "games")?,
            wins: count(row.wins, "wins")?,
            losses: count(row.losses, "losses")?,
            name: row.name.clone(),
            style,
        })
    }
}

impl From<&LeaderboardEntry> for LeaderboardChanges {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            name: entry.name.clone(),
            games: saturating_i32(entry.games),
            wins: saturating_i32(entry.wins),
            losses: saturating_i32(entry.losses),
            style: entry.style.to_string(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
