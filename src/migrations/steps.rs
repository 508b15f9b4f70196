//! Schema migration steps
//!
//! Steps are applied in ascending `version` order and rolled back in
//! descending order. Each `up` runs in one transaction together with its
//! bookkeeping insert, each `down` together with its bookkeeping delete.

/// One forward/backward schema transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    /// SQL applied by migrate
    pub up: &'static str,
    /// SQL applied by rollback; must succeed on a populated schema
    pub down: &'static str,
    /// Tables that must exist while this step is applied
    pub tables: &'static [&'static str],
}

const ADD_TABLES_UP: &str = "
CREATE TABLE entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    happy INTEGER,
    social INTEGER,
    energy INTEGER,
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX entry_created_at_index ON entry(CAST(strftime('%s', created_at) AS INTEGER));
";

const ADD_TABLES_DOWN: &str = "
DROP INDEX IF EXISTS entry_created_at_index;
DROP TABLE IF EXISTS entry;
";

/// Every known step, ascending by version
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "add-tables",
    up: ADD_TABLES_UP,
    down: ADD_TABLES_DOWN,
    tables: &["entry"],
}];
