//! Moodlog storage layer
//!
//! - **codec**: Conversion between wire and stored timestamps
//! - **database**: Shared SQLite connection handle
//! - **entries**: The `entry` table (create, first/last, range reads)
//! - **types**: Core data structures (Entry, NewEntry, TimeFilter)
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   NewEntry → validate → encode(now) → INSERT INTO entry
//!
//! Read Path:
//!   TimeFilter → unix-second predicate → SELECT ... ORDER BY created_at → decode
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use moodlog::migrations::MigrationManager;
//! use moodlog::storage::{Database, DatabaseConfig, EntryStore, NewEntry, TimeFilter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(&DatabaseConfig::new("./moodlog.db"))?;
//!     MigrationManager::new(db.clone()).migrate()?;
//!
//!     let store = EntryStore::new(db);
//!     store.create(&NewEntry::new(70, 40, 55).notes("long walk"))?;
//!
//!     let entries = store.query_range(TimeFilter::All)?;
//!     println!("{} entries", entries.len());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod database;
pub mod entries;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use codec::ParseError;
pub use database::{Database, DatabaseConfig};
pub use entries::EntryStore;
pub use error::{StorageError, StorageResult};
pub use types::{Entry, NewEntry, TimeFilter, METRIC_MAX, METRIC_MIN};
