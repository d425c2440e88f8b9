//! SQLite leaderboard store
//!
//! One table, one index:
//!
//! ```sql
//! CREATE TABLE scores (
//!     seq      INTEGER PRIMARY KEY AUTOINCREMENT,
//!     level_id TEXT NOT NULL,
//!     name     TEXT NOT NULL,
//!     time     REAL NOT NULL
//! );
//! CREATE INDEX scores_level_time ON scores (level_id, time, seq);
//! ```
//!
//! `seq` is the insertion sequence, so `ORDER BY time, seq` gives the stable
//! tie order without sorting in Rust. Each append is a single INSERT, which
//! SQLite commits atomically; readers never see a partial row.
//!
//! The connection is opened once and shared behind a `parking_lot::Mutex`.
//! Both the mutex wait and SQLite's busy handler are bounded by the configured
//! lock timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection, ErrorCode};
use scorekeep_core::{
    CompletionTime, LeaderboardStore, Limits, ScoreEntry, StoreError, StoreResult,
};
use tracing::{debug, error, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS scores (
    seq      INTEGER PRIMARY KEY AUTOINCREMENT,
    level_id TEXT NOT NULL,
    name     TEXT NOT NULL,
    time     REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS scores_level_time ON scores (level_id, time, seq);
";

const COLUMNS: [&str; 4] = ["seq", "level_id", "name", "time"];

/// Leaderboard persisted in a SQLite database file
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
    limits: Limits,
    lock_timeout: Duration,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Runs `PRAGMA quick_check` before accepting the file.
    ///
    /// # Errors
    ///
    /// - `StoreError::Corrupt` if the file is not a database, fails the check,
    ///   or holds a `scores` table with different columns.
    /// - `StoreError::Unavailable` if it cannot be opened or stays busy past
    ///   the timeout.
    pub fn open(
        path: impl AsRef<Path>,
        limits: Limits,
        lock_timeout: Duration,
        sync: bool,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::unavailable(format!("failed to create data directory: {}", e))
            })?;
        }

        let conn = Connection::open(&path).map_err(map_sqlite_error)?;
        Self::from_connection(conn, path, limits, lock_timeout, sync)
    }

    /// Open a private in-memory database
    pub fn open_in_memory(limits: Limits) -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::from_connection(
            conn,
            PathBuf::from(":memory:"),
            limits,
            crate::config::DEFAULT_LOCK_TIMEOUT,
            false,
        )
    }

    fn from_connection(
        conn: Connection,
        path: PathBuf,
        limits: Limits,
        lock_timeout: Duration,
        sync: bool,
    ) -> StoreResult<Self> {
        conn.busy_timeout(lock_timeout).map_err(map_sqlite_error)?;

        let check: String = conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(map_sqlite_error)?;
        if check != "ok" {
            error!(target: "scorekeep::store", path = ?path, check = %check, "SQLite integrity check failed");
            return Err(StoreError::corrupt(format!("integrity check failed: {}", check)));
        }
        check_columns(&conn, &path)?;

        let journal: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(map_sqlite_error)?;
        conn.pragma_update(None, "synchronous", if sync { "FULL" } else { "NORMAL" })
            .map_err(map_sqlite_error)?;
        conn.execute_batch(SCHEMA).map_err(map_sqlite_error)?;

        let entries: i64 = conn
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))
            .map_err(map_sqlite_error)?;
        info!(target: "scorekeep::store", path = ?path, journal_mode = %journal, entries, "Opened SQLite leaderboard");

        Ok(SqliteStore {
            path,
            conn: Mutex::new(conn),
            limits,
            lock_timeout,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.try_lock_for(self.lock_timeout).ok_or_else(|| {
            StoreError::unavailable(format!(
                "timed out after {:?} waiting for database connection",
                self.lock_timeout
            ))
        })
    }
}

impl LeaderboardStore for SqliteStore {
    fn append(&self, level_id: &str, player_name: &str, time_seconds: f64) -> StoreResult<()> {
        let entry = ScoreEntry::new(level_id, player_name, time_seconds, &self.limits)?;

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO scores (level_id, name, time) VALUES (?1, ?2, ?3)",
            params![entry.level_id(), entry.player_name(), entry.time_seconds()],
        )
        .map_err(|e| {
            error!(target: "scorekeep::store", backend = "sqlite", level_id, error = %e, "Insert failed");
            map_sqlite_error(e)
        })?;

        debug!(target: "scorekeep::store", backend = "sqlite", level_id, player_name, time_seconds, "Appended entry");
        Ok(())
    }

    fn top(&self, level_id: &str, limit: usize) -> StoreResult<Vec<ScoreEntry>> {
        self.limits.validate_level_id(level_id)?;
        self.limits.validate_top_limit(limit)?;

        let conn = self.connection()?;
        let mut stmt = conn
            .prepare_cached(
                "SELECT name, time FROM scores WHERE level_id = ?1 ORDER BY time ASC, seq ASC LIMIT ?2",
            )
            .map_err(map_sqlite_error)?;
        let rows = stmt
            .query_map(params![level_id, limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(map_sqlite_error)?;

        let mut entries = Vec::with_capacity(limit);
        for row in rows {
            let (name, time) = row.map_err(map_sqlite_error)?;
            let time = CompletionTime::new(time).map_err(|e| {
                StoreError::corrupt(format!(
                    "level '{}' has a row with an invalid time: {}",
                    level_id, e
                ))
            })?;
            entries.push(ScoreEntry::from_parts(level_id, name, time));
        }
        Ok(entries)
    }

    fn count(&self, level_id: &str) -> StoreResult<usize> {
        self.limits.validate_level_id(level_id)?;
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM scores WHERE level_id = ?1",
                params![level_id],
                |row| row.get(0),
            )
            .map_err(map_sqlite_error)?;
        Ok(count as usize)
    }

    fn levels(&self) -> StoreResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare_cached("SELECT DISTINCT level_id FROM scores ORDER BY level_id")
            .map_err(map_sqlite_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(map_sqlite_error)?;
        let levels = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlite_error)?;
        Ok(levels)
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

/// An existing `scores` table must have the columns this store writes
fn check_columns(conn: &Connection, path: &Path) -> StoreResult<()> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('scores')")
        .map_err(map_sqlite_error)?;
    let found = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(map_sqlite_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_sqlite_error)?;
    if found.is_empty() {
        return Ok(());
    }

    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|column| !found.iter().any(|f| f == column))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    error!(target: "scorekeep::store", path = ?path, ?found, ?missing, "Existing scores table has an unknown layout");
    Err(StoreError::corrupt(format!(
        "table 'scores' has columns {:?}, missing {:?}; the database was not created by this store",
        found, missing
    )))
}

/// Classify a SQLite failure
///
/// Damaged files and rows of the wrong type are `Corrupt`; everything else
/// (busy, locked, I/O, full disk, permissions) is `Unavailable`.
fn map_sqlite_error(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase
            ) =>
        {
            StoreError::corrupt(e.to_string())
        }
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            StoreError::corrupt(e.to_string())
        }
        _ => StoreError::unavailable(e.to_string()),
    }
}
