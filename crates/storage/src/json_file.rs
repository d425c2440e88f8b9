//! JSON document leaderboard store
//!
//! The whole leaderboard is one JSON object mapping level id to an array of
//! `{"name", "time"}` records in insertion order:
//!
//! ```json
//! {
//!   "lvl1": [{"name": "alice", "time": 12.5}, {"name": "bob", "time": 9.3}]
//! }
//! ```
//!
//! # Concurrency
//!
//! The document is loaded once at open and kept in memory behind an `RwLock`.
//! An append holds the write lock across the full read-modify-write cycle:
//! push in memory, write the new document to `<file>.tmp`, fsync, rename over
//! the original, fsync the directory. If a step before the rename fails the
//! in-memory push is rolled back. Once the rename has happened the new
//! document is what a restart will load, so the push stays even if the
//! directory fsync then fails. Readers take the read lock and are served from
//! memory.
//!
//! An exclusive `fs2` lock on `<file>.lock` keeps a second process from
//! opening the same document.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use parking_lot::RwLock;
use scorekeep_core::{
    top_n, CompletionTime, LeaderboardStore, Limits, ScoreEntry, StoreError, StoreResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// One record as it appears in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredScore {
    name: String,
    time: CompletionTime,
}

type Document = BTreeMap<String, Vec<StoredScore>>;

/// Leaderboard persisted as a single JSON document
pub struct JsonFileStore {
    path: PathBuf,
    document: RwLock<Document>,
    limits: Limits,
    lock_timeout: Duration,
    sync: bool,
    sync_dir: fn(&Path) -> io::Result<()>,
    // Held for the lifetime of the store; the OS releases the lock on drop
    _process_lock: File,
}

impl JsonFileStore {
    /// Open (or create) the document at `path`
    ///
    /// # Errors
    ///
    /// - `StoreError::Unavailable` if the file cannot be read or another
    ///   process holds the lock.
    /// - `StoreError::Corrupt` if the file is not a valid leaderboard document.
    pub fn open(
        path: impl AsRef<Path>,
        limits: Limits,
        lock_timeout: Duration,
        sync: bool,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::unavailable(format!("failed to create data directory: {}", e))
            })?;
        }

        let process_lock = acquire_process_lock(&path)?;

        let document = if path.exists() {
            load_document(&path)?
        } else {
            let empty = Document::new();
            write_document(&path, &empty, sync, sync_parent_dir).map_err(|f| f.error)?;
            info!(target: "scorekeep::store", path = ?path, "Created empty leaderboard document");
            empty
        };

        Ok(JsonFileStore {
            path,
            document: RwLock::new(document),
            limits,
            lock_timeout,
            sync,
            sync_dir: sync_parent_dir,
            _process_lock: process_lock,
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_timed_out(&self) -> StoreError {
        StoreError::unavailable(format!(
            "timed out after {:?} waiting for leaderboard document",
            self.lock_timeout
        ))
    }
}

impl LeaderboardStore for JsonFileStore {
    fn append(&self, level_id: &str, player_name: &str, time_seconds: f64) -> StoreResult<()> {
        let entry = ScoreEntry::new(level_id, player_name, time_seconds, &self.limits)?;

        let mut document = self
            .document
            .try_write_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out())?;

        document
            .entry(level_id.to_string())
            .or_default()
            .push(StoredScore {
                name: entry.player_name().to_string(),
                time: entry.time(),
            });

        if let Err(failure) = write_document(&self.path, &document, self.sync, self.sync_dir) {
            // Memory must match the document a restart would load
            if !failure.renamed {
                if let Some(scores) = document.get_mut(level_id) {
                    scores.pop();
                    if scores.is_empty() {
                        document.remove(level_id);
                    }
                }
            }
            error!(target: "scorekeep::store", backend = "json", path = ?self.path, renamed = failure.renamed, error = %failure.error, "Failed to persist leaderboard document");
            return Err(failure.error);
        }

        debug!(target: "scorekeep::store", backend = "json", level_id, player_name, time_seconds, "Appended entry");
        Ok(())
    }

    fn top(&self, level_id: &str, limit: usize) -> StoreResult<Vec<ScoreEntry>> {
        self.limits.validate_level_id(level_id)?;
        self.limits.validate_top_limit(limit)?;

        let document = self
            .document
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out())?;

        let Some(scores) = document.get(level_id) else {
            return Ok(Vec::new());
        };

        let ranked = scores
            .iter()
            .enumerate()
            .map(|(seq, s)| (s.time, seq as u64, s));

        Ok(top_n(ranked, limit)
            .into_iter()
            .map(|s| ScoreEntry::from_parts(level_id, s.name.as_str(), s.time))
            .collect())
    }

    fn count(&self, level_id: &str) -> StoreResult<usize> {
        self.limits.validate_level_id(level_id)?;
        let document = self
            .document
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out())?;
        Ok(document.get(level_id).map_or(0, Vec::len))
    }

    fn levels(&self) -> StoreResult<Vec<String>> {
        let document = self
            .document
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out())?;
        // BTreeMap keys are already sorted
        Ok(document
            .iter()
            .filter(|(_, scores)| !scores.is_empty())
            .map(|(level_id, _)| level_id.clone())
            .collect())
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn acquire_process_lock(path: &Path) -> StoreResult<File> {
    let lock_path = lock_path(path);
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .map_err(|e| StoreError::unavailable(format!("failed to open lock file: {}", e)))?;
    lock_file.try_lock_exclusive().map_err(|_| {
        StoreError::unavailable(format!(
            "leaderboard document '{}' is already in use by another process",
            path.display()
        ))
    })?;
    Ok(lock_file)
}

/// Read and validate the document
///
/// A zero-length file is treated as an empty leaderboard. Anything that is
/// not an object of arrays of `{name, time}` with valid times is `Corrupt`;
/// `CompletionTime` rejects negative times during deserialization.
fn load_document(path: &Path) -> StoreResult<Document> {
    let bytes = fs::read(path).map_err(|e| {
        StoreError::unavailable(format!("failed to read leaderboard document: {}", e))
    })?;
    if bytes.is_empty() {
        return Ok(Document::new());
    }

    let document: Document = serde_json::from_slice(&bytes).map_err(|e| {
        error!(target: "scorekeep::store", path = ?path, error = %e, "Leaderboard document is not valid JSON");
        StoreError::corrupt(format!("leaderboard document is malformed: {}", e))
    })?;

    let total: usize = document.values().map(Vec::len).sum();
    info!(target: "scorekeep::store", path = ?path, levels = document.len(), entries = total, "Loaded leaderboard document");
    Ok(document)
}

/// A document write that did not complete
struct WriteFailure {
    /// The new document already replaced the old one
    renamed: bool,
    error: StoreError,
}

fn sync_parent_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Persist the document atomically (write-fsync-rename)
fn write_document(
    path: &Path,
    document: &Document,
    sync: bool,
    sync_dir: fn(&Path) -> io::Result<()>,
) -> Result<(), WriteFailure> {
    let bytes = serde_json::to_vec(document).map_err(|e| WriteFailure {
        renamed: false,
        error: StoreError::unavailable(format!("failed to encode document: {}", e)),
    })?;

    let temp_path = temp_path(path);
    let write = || -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(&bytes)?;
        if sync {
            file.sync_all()?;
        }
        drop(file);

        // Atomic rename
        fs::rename(&temp_path, path)
    };

    write().map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        WriteFailure {
            renamed: false,
            error: StoreError::unavailable(format!("failed to write leaderboard document: {}", e)),
        }
    })?;

    if sync {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent).map_err(|e| WriteFailure {
                renamed: true,
                error: StoreError::unavailable(format!("failed to sync data directory: {}", e)),
            })?;
        }
    }
    Ok(())
}
