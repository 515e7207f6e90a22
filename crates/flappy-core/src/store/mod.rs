//! Durable storage for player selections and score history.
//!
//! Every operation is its own unit of work. Nothing here is retried; storage
//! failures surface as [`FlappyError::Storage`](crate::FlappyError::Storage).
//!
//! Only one process should write a given database at a time. SQLite's file
//! lock plus a busy timeout is the only protection against concurrent writers.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{PlayerSelection, ScoreRecord};

/// Persistence contract used by the selection flow and game statistics.
pub trait PersistenceStore: Send + Sync {
    /// Stored selection for `username`, or the built-in default when none exists.
    fn get_selection(&self, username: &str) -> Result<PlayerSelection>;

    /// Insert or replace the selection for `username`.
    fn set_selection(&self, username: &str, sprite_id: &str, display_name: &str) -> Result<()>;

    /// Append a score record and return its row id.
    fn record_score(&self, username: &str, score: u32) -> Result<i64>;

    /// Highest recorded score for `username`, `0` when there are no records.
    fn get_high_score(&self, username: &str) -> Result<u32>;

    /// Most recent score records for `username`, newest first.
    fn score_history(&self, username: &str, limit: usize) -> Result<Vec<ScoreRecord>>;
}
