//! Durable key-value backends.
//!
//! A backend stores opaque (already encrypted) string values. Every call
//! is durable when it returns, and [`SecureStorage::apply`] commits a batch
//! of changes atomically.

use crate::error::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// One change in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Set { key: String, value: String },
    Remove { key: String },
    /// Remove every key.
    Clear,
}

/// Persistent key-value storage the credential store writes through.
pub trait SecureStorage: Send + Sync {
    /// Short name of the implementation, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Applies all `ops` in order, atomically.
    fn apply(&self, ops: &[StorageOp]) -> StoreResult<()>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.apply(&[StorageOp::Set {
            key: key.to_string(),
            value: value.to_string(),
        }])
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.apply(&[StorageOp::Remove {
            key: key.to_string(),
        }])
    }
}

/// SQLite-backed storage. One row per key.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens (or creates) a database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
            path: None,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Database file, or `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            PRAGMA synchronous = FULL;

            CREATE TABLE IF NOT EXISTS secure_prefs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl SecureStorage for SqliteStorage {
    fn kind(&self) -> &'static str {
        if self.path.is_some() { "sqlite" } else { "sqlite-memory" }
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row(
                "SELECT value FROM secure_prefs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn apply(&self, ops: &[StorageOp]) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let now = now_millis();
        for op in ops {
            match op {
                StorageOp::Set { key, value } => {
                    tx.execute(
                        "INSERT INTO secure_prefs (key, value, updated_at) VALUES (?1, ?2, ?3)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                        params![key, value, now],
                    )?;
                }
                StorageOp::Remove { key } => {
                    tx.execute("DELETE FROM secure_prefs WHERE key = ?1", params![key])?;
                }
                StorageOp::Clear => {
                    tx.execute("DELETE FROM secure_prefs", [])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
