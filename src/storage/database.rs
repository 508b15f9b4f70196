//! Database handle
//!
//! Owns the single SQLite connection shared by the entry store and the
//! migration manager. `rusqlite::Connection` is not `Sync`, so it sits
//! behind a `std::sync::Mutex`; every operation takes the lock for the
//! duration of one call and releases it before returning.

use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::storage::error::{StorageError, StorageResult};

/// How to open the database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite file; created (with parent directories) when missing
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_millis(5_000),
        }
    }

    /// Builder method: set the busy timeout
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Shared handle to the moodlog SQLite database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) a file-backed database
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
        configure_connection(&conn, config.busy_timeout)?;

        tracing::debug!(path = ?config.path, "Opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(config.path.clone()),
        })
    }

    /// Open a private in-memory database (tests, benchmarks)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_connection(&conn, Duration::from_millis(5_000))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take exclusive access to the connection until the guard drops
    pub(crate) fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("database connection poisoned: {}", e)))
    }

    /// Run `f` with exclusive access to the connection
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.lock()?;
        f(&mut conn)
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> StorageResult<bool> {
        self.with_conn(|conn| table_exists(conn, table))
    }
}

/// Check whether a table exists on an already-locked connection
pub(crate) fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> StorageResult<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}
