//! Entry store
//!
//! Durable storage of mood entries in the `entry` table. The table itself
//! is created by migration step 1; every method here fails with a
//! `StorageError` when the schema has not been migrated yet.
//!
//! Ordering and range filtering compare `created_at` as unix seconds
//! (`strftime('%s', ...)`) rather than as strings.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use crate::storage::codec;
use crate::storage::database::Database;
use crate::storage::error::StorageResult;
use crate::storage::types::{Entry, NewEntry, TimeFilter};

const SELECT_ENTRY: &str = "SELECT id, happy, social, energy, notes, created_at FROM entry";
const ORDER_ASC: &str = "ORDER BY CAST(strftime('%s', created_at) AS INTEGER) ASC, id ASC";
const ORDER_DESC: &str = "ORDER BY CAST(strftime('%s', created_at) AS INTEGER) DESC, id DESC";

/// A row as read from SQLite, before `created_at` is decoded
struct EntryRow {
    id: i64,
    happy: i64,
    social: i64,
    energy: i64,
    notes: Option<String>,
    created_at: String,
}

impl EntryRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            happy: row.get(1)?,
            social: row.get(2)?,
            energy: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_entry(self) -> StorageResult<Entry> {
        Ok(Entry {
            id: self.id,
            happy: self.happy,
            social: self.social,
            energy: self.energy,
            notes: self.notes,
            created_at: codec::decode(&self.created_at)?,
        })
    }
}

/// Reads and writes rows of the `entry` table
#[derive(Clone)]
pub struct EntryStore {
    db: Database,
}

impl EntryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert an entry stamped with the current server time
    pub fn create(&self, entry: &NewEntry) -> StorageResult<Entry> {
        self.create_at(entry, Utc::now())
    }

    /// Insert an entry with an explicit `created_at`
    ///
    /// The stored timestamp keeps second precision only; the returned entry
    /// carries the truncated value, exactly as later reads will see it.
    pub fn create_at(&self, entry: &NewEntry, created_at: DateTime<Utc>) -> StorageResult<Entry> {
        entry.validate()?;
        let created_at = codec::encode(created_at);

        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entry (happy, social, energy, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.happy,
                    entry.social,
                    entry.energy,
                    entry.notes,
                    created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::debug!(entry_id = id, created_at = %created_at, "Created entry");

        EntryRow {
            id,
            happy: entry.happy,
            social: entry.social,
            energy: entry.energy,
            notes: entry.notes.clone(),
            created_at,
        }
        .into_entry()
    }

    /// Earliest entry by `created_at`
    pub fn first(&self) -> StorageResult<Option<Entry>> {
        self.edge(ORDER_ASC)
    }

    /// Latest entry by `created_at`
    pub fn last(&self) -> StorageResult<Option<Entry>> {
        self.edge(ORDER_DESC)
    }

    fn edge(&self, order: &str) -> StorageResult<Option<Entry>> {
        let sql = format!("{} {} LIMIT 1", SELECT_ENTRY, order);
        let row = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(&sql, [], EntryRow::read)
                .optional()?)
        })?;

        row.map(EntryRow::into_entry).transpose()
    }

    /// Entries passing `filter`, ascending by `created_at`
    pub fn query_range(&self, filter: TimeFilter) -> StorageResult<Vec<Entry>> {
        let (predicate, values) = filter.predicate();
        let sql = format!("{} WHERE {} {}", SELECT_ENTRY, predicate, ORDER_ASC);

        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), EntryRow::read)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    /// Number of stored entries
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.db.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM entry", [], |row| row.get(0))?)
        })?;
        Ok(count as u64)
    }
}
