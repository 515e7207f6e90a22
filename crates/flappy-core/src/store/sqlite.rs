//! SQLite-backed persistence store.

use super::PersistenceStore;
use crate::config::StoreConfig;
use crate::error::{FlappyError, Result};
use crate::models::{PlayerSelection, ScoreRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// SQLite store that opens a fresh connection for every operation.
///
/// Holding no connection between calls keeps each operation self-contained:
/// open, execute, commit, release.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open the store at `db_path`, creating the file, parent directories and
    /// schema if needed.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| FlappyError::Io {
                    message: format!("Failed to create database directory: {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        let conn = store.connect()?;
        Self::ensure_schema(&conn)?;
        debug!("Opened score database at {}", db_path.display());

        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).map_err(|e| FlappyError::Storage {
            message: format!("Failed to open {}: {}", self.db_path.display(), e),
            source: Some(e),
        })?;
        conn.busy_timeout(Duration::from_millis(StoreConfig::BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS score_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                score INTEGER NOT NULL CHECK (score >= 0),
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_score_history_user
                ON score_history(username, score);

            CREATE TABLE IF NOT EXISTS player_selection (
                username TEXT PRIMARY KEY,
                selected_sprite_id TEXT NOT NULL,
                sprite_display_name TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl PersistenceStore for SqliteStore {
    fn get_selection(&self, username: &str) -> Result<PlayerSelection> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT selected_sprite_id, sprite_display_name
                 FROM player_selection WHERE username = ?1",
                params![username],
                |row| {
                    Ok(PlayerSelection {
                        sprite_id: row.get(0)?,
                        display_name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(row.unwrap_or_default())
    }

    fn set_selection(&self, username: &str, sprite_id: &str, display_name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO player_selection (username, selected_sprite_id, sprite_display_name)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(username) DO UPDATE SET
                selected_sprite_id = excluded.selected_sprite_id,
                sprite_display_name = excluded.sprite_display_name",
            params![username, sprite_id, display_name],
        )?;
        debug!("Saved selection {} ({}) for {}", display_name, sprite_id, username);
        Ok(())
    }

    fn record_score(&self, username: &str, score: u32) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO score_history (username, score, recorded_at) VALUES (?1, ?2, ?3)",
            params![username, score, Utc::now().to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Recorded score {} for {} (row {})", score, username, id);
        Ok(id)
    }

    fn get_high_score(&self, username: &str) -> Result<u32> {
        let conn = self.connect()?;
        let high: Option<u32> = conn.query_row(
            "SELECT MAX(score) FROM score_history WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(high.unwrap_or(0))
    }

    fn score_history(&self, username: &str, limit: usize) -> Result<Vec<ScoreRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, score, recorded_at FROM score_history
             WHERE username = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![username, limit], |row| {
            Ok(ScoreRecord {
                id: row.get(0)?,
                username: row.get(1)?,
                score: row.get(2)?,
                recorded_at: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
