//! Migration manager
//!
//! A state machine over the schema version. The version is the highest row
//! of the bookkeeping table; the table's absence means "not initialised".
//!
//! ```text
//!              init / migrate            migrate
//! uninitialised ────────────▶ v1 ──▶ ... ──────▶ latest
//!       ▲                      │ rollback         │ rollback
//!       │        reset         ▼                  ▼
//!       └─────────────────── v0 ◀── ... ◀──── latest-1
//! ```
//!
//! The connection lock is held for the whole of each operation, so two
//! migration operations never interleave within one process. Each step
//! commits its schema change and its bookkeeping row in one transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::migrations::error::{MigrationError, MigrationResult};
use crate::migrations::steps::{Migration, MIGRATIONS};
use crate::storage::codec;
use crate::storage::database::{table_exists, Database};
use crate::storage::{StorageError, StorageResult};

/// Bookkeeping table, one row per applied step
pub const BOOKKEEPING_TABLE: &str = "moodlog_migrations";

/// An applied step as recorded in the bookkeeping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    pub version: u32,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// What a migration command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Version before the command (0 when uninitialised)
    pub from_version: u32,
    /// Version after the command
    pub to_version: u32,
    /// Versions whose up or down step ran, in execution order
    pub steps: Vec<u32>,
}

impl MigrationOutcome {
    fn unchanged(version: u32) -> Self {
        Self {
            from_version: version,
            to_version: version,
            steps: Vec::new(),
        }
    }

    /// Whether any step ran
    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        if self.changed() {
            format!(
                "Database moved from version {} to {}",
                self.from_version, self.to_version
            )
        } else {
            format!("Database already at version {}", self.to_version)
        }
    }
}

/// Machine-readable reason for an unhealthy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthCode {
    #[serde(rename = "DB_NOT_INITIALISED")]
    NotInitialised,
    #[serde(rename = "DB_NEEDS_MIGRATION")]
    NeedsMigration,
    #[serde(rename = "DB_VERSION_AHEAD")]
    VersionAhead,
    #[serde(rename = "DB_MISSING_TABLE")]
    MissingTable,
    #[serde(rename = "DB_ERROR")]
    Error,
}

impl HealthCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCode::NotInitialised => "DB_NOT_INITIALISED",
            HealthCode::NeedsMigration => "DB_NEEDS_MIGRATION",
            HealthCode::VersionAhead => "DB_VERSION_AHEAD",
            HealthCode::MissingTable => "DB_MISSING_TABLE",
            HealthCode::Error => "DB_ERROR",
        }
    }
}

impl std::fmt::Display for HealthCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a status check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<HealthCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Current schema version, `None` when uninitialised or unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl DatabaseStatus {
    fn healthy(version: u32) -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            version: Some(version),
        }
    }

    fn unhealthy(code: HealthCode, message: impl Into<String>, version: Option<u32>) -> Self {
        Self {
            ok: false,
            code: Some(code),
            message: Some(message.into()),
            version,
        }
    }
}

/// Owns the schema version of one database
#[derive(Clone)]
pub struct MigrationManager {
    db: Database,
    migrations: &'static [Migration],
}

impl MigrationManager {
    /// Manage `db` with the built-in migration chain
    pub fn new(db: Database) -> Self {
        Self::with_migrations(db, MIGRATIONS)
    }

    /// Manage `db` with a custom chain, ascending by version
    pub fn with_migrations(db: Database, migrations: &'static [Migration]) -> Self {
        debug_assert!(
            migrations.windows(2).all(|w| w[0].version < w[1].version),
            "migrations must be sorted by ascending version"
        );
        Self { db, migrations }
    }

    /// Version of the last known step
    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    /// Current schema version, `None` when not initialised
    pub fn current_version(&self) -> MigrationResult<Option<u32>> {
        let conn = self.db.lock()?;
        Ok(read_version(&conn)?)
    }

    /// Applied steps, ascending by version
    pub fn applied(&self) -> MigrationResult<Vec<MigrationRecord>> {
        let conn = self.db.lock()?;
        if !table_exists(&conn, BOOKKEEPING_TABLE)? {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT version, name, applied_at FROM {} ORDER BY version ASC",
            BOOKKEEPING_TABLE
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(version, name, applied_at)| -> MigrationResult<MigrationRecord> {
                Ok(MigrationRecord {
                    version,
                    name,
                    applied_at: codec::decode(&applied_at).map_err(StorageError::from)?,
                })
            })
            .collect()
    }

    /// Report whether the database is at the latest version with every
    /// required table in place. Never fails; problems become `ok = false`.
    pub fn status(&self) -> DatabaseStatus {
        match self.inspect() {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "Database status check failed");
                DatabaseStatus::unhealthy(HealthCode::Error, e.to_string(), None)
            }
        }
    }

    fn inspect(&self) -> MigrationResult<DatabaseStatus> {
        let conn = self.db.lock()?;
        let latest = self.latest_version();

        let version = match read_version(&conn)? {
            Some(version) => version,
            None => {
                return Ok(DatabaseStatus::unhealthy(
                    HealthCode::NotInitialised,
                    "database is not initialised; run init or migrate",
                    None,
                ))
            }
        };

        if version < latest {
            return Ok(DatabaseStatus::unhealthy(
                HealthCode::NeedsMigration,
                format!(
                    "database is at version {} but the latest migration is {}; run migrate",
                    version, latest
                ),
                Some(version),
            ));
        }

        if version > latest {
            return Ok(DatabaseStatus::unhealthy(
                HealthCode::VersionAhead,
                format!(
                    "database version {} is newer than the latest known migration {}",
                    version, latest
                ),
                Some(version),
            ));
        }

        for migration in self.migrations.iter().filter(|m| m.version <= version) {
            for table in migration.tables {
                if !table_exists(&conn, table)? {
                    return Ok(DatabaseStatus::unhealthy(
                        HealthCode::MissingTable,
                        format!(
                            "table `{}` required by migration {} ({}) is missing",
                            table, migration.version, migration.name
                        ),
                        Some(version),
                    ));
                }
            }
        }

        Ok(DatabaseStatus::healthy(version))
    }

    /// Create the bookkeeping table and apply the first step if it is not
    /// applied yet. A no-op once initialised.
    pub fn init(&self) -> MigrationResult<MigrationOutcome> {
        let mut conn = self.db.lock()?;
        self.init_locked(&mut conn)
    }

    fn init_locked(&self, conn: &mut Connection) -> MigrationResult<MigrationOutcome> {
        let from = read_version(conn)?.unwrap_or(0);
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
            BOOKKEEPING_TABLE
        ))?;

        let mut outcome = MigrationOutcome::unchanged(from);
        if from == 0 {
            if let Some(first) = self.migrations.first() {
                apply_up(conn, first)?;
                outcome.to_version = first.version;
                outcome.steps.push(first.version);
            }
        }
        Ok(outcome)
    }

    /// Initialise, then apply every pending step in ascending order.
    ///
    /// Stops at the first failing step; earlier steps stay applied.
    pub fn migrate(&self) -> MigrationResult<MigrationOutcome> {
        let mut conn = self.db.lock()?;
        let mut outcome = self.init_locked(&mut conn)?;

        let latest = self.latest_version();
        if outcome.to_version > latest {
            return Err(MigrationError::State(format!(
                "database version {} is newer than the latest known migration {}",
                outcome.to_version, latest
            )));
        }

        let current = outcome.to_version;
        for migration in self.migrations.iter().filter(|m| m.version > current) {
            apply_up(&mut conn, migration)?;
            outcome.to_version = migration.version;
            outcome.steps.push(migration.version);
        }

        tracing::info!(
            from = outcome.from_version,
            to = outcome.to_version,
            "Migration complete"
        );
        Ok(outcome)
    }

    /// Undo the current step. Forced: tables are dropped with their rows.
    pub fn rollback(&self) -> MigrationResult<MigrationOutcome> {
        let mut conn = self.db.lock()?;
        let version = match read_version(&conn)? {
            None => {
                return Err(MigrationError::State(
                    "database is not initialised; nothing to roll back".to_string(),
                ))
            }
            Some(0) => {
                return Err(MigrationError::State(
                    "no migrations applied; nothing to roll back".to_string(),
                ))
            }
            Some(version) => version,
        };

        let migration = self.find(version)?;
        apply_down(&mut conn, migration)?;

        Ok(MigrationOutcome {
            from_version: version,
            to_version: read_version(&conn)?.unwrap_or(0),
            steps: vec![version],
        })
    }

    /// Roll back every applied step, newest first, then remove the
    /// bookkeeping table. A no-op on an uninitialised database.
    pub fn reset(&self) -> MigrationResult<MigrationOutcome> {
        let mut conn = self.db.lock()?;
        let from = match read_version(&conn)? {
            Some(version) => version,
            None => return Ok(MigrationOutcome::unchanged(0)),
        };

        let mut outcome = MigrationOutcome::unchanged(from);
        let mut version = from;
        while version > 0 {
            let migration = self.find(version)?;
            apply_down(&mut conn, migration)?;
            outcome.steps.push(version);
            version = read_version(&conn)?.unwrap_or(0);
            outcome.to_version = version;
        }

        conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", BOOKKEEPING_TABLE))?;
        tracing::info!(from = from, "Database reset");
        Ok(outcome)
    }

    fn find(&self, version: u32) -> MigrationResult<&'static Migration> {
        self.migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| {
                MigrationError::State(format!(
                    "database is at version {} but no such migration is known",
                    version
                ))
            })
    }
}

fn read_version(conn: &Connection) -> StorageResult<Option<u32>> {
    if !table_exists(conn, BOOKKEEPING_TABLE)? {
        return Ok(None);
    }
    let version: u32 = conn.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM {}", BOOKKEEPING_TABLE),
        [],
        |row| row.get(0),
    )?;
    Ok(Some(version))
}

fn apply_up(conn: &mut Connection, migration: &Migration) -> MigrationResult<()> {
    up_in_transaction(conn, migration).map_err(|source| MigrationError::Step {
        version: migration.version,
        name: migration.name,
        source,
    })?;
    tracing::info!(
        version = migration.version,
        name = migration.name,
        "Applied migration"
    );
    Ok(())
}

fn up_in_transaction(conn: &mut Connection, migration: &Migration) -> StorageResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.up)?;
    tx.execute(
        &format!(
            "INSERT INTO {} (version, name, applied_at) VALUES (?1, ?2, ?3)",
            BOOKKEEPING_TABLE
        ),
        params![migration.version, migration.name, codec::encode(Utc::now())],
    )?;
    tx.commit()?;
    Ok(())
}

fn apply_down(conn: &mut Connection, migration: &Migration) -> MigrationResult<()> {
    down_in_transaction(conn, migration).map_err(|source| MigrationError::Step {
        version: migration.version,
        name: migration.name,
        source,
    })?;
    tracing::info!(
        version = migration.version,
        name = migration.name,
        "Rolled back migration"
    );
    Ok(())
}

fn down_in_transaction(conn: &mut Connection, migration: &Migration) -> StorageResult<()> {
    let tx = conn.transaction()?;
    for table in migration.tables {
        if !table_exists(&tx, table)? {
            tracing::warn!(
                table = %table,
                version = migration.version,
                "Table already missing during rollback"
            );
        }
    }
    tx.execute_batch(migration.down)?;
    tx.execute(
        &format!("DELETE FROM {} WHERE version = ?1", BOOKKEEPING_TABLE),
        params![migration.version],
    )?;
    tx.commit()?;
    Ok(())
}
