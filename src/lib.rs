//! # Moodlog
//!
//! Backend for a personal mood log: timestamped entries holding three
//! 0-100 levels (happiness, social, energy) plus notes, stored in SQLite
//! under versioned migrations and served as chart data over HTTP.
//!
//! ## Modules
//!
//! - [`storage`]: Timestamp codec, database handle and entry store
//! - [`migrations`]: Versioned schema steps and their state machine
//! - [`query`]: Graph data for a time window
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodlog::migrations::MigrationManager;
//! use moodlog::query::QueryService;
//! use moodlog::storage::{Database, DatabaseConfig, EntryStore, NewEntry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(&DatabaseConfig::new("moodlog.db"))?;
//!
//!     // Bring the schema up to date
//!     MigrationManager::new(db.clone()).migrate()?;
//!
//!     // Log an entry
//!     let store = EntryStore::new(db);
//!     store.create(&NewEntry::new(72, 40, 65).notes("long walk"))?;
//!
//!     // Everything after the start of 2024
//!     let data = QueryService::new(store).graph_data(Some("2024-01-01T00:00:00Z"), None)?;
//!     println!("Found {} entries", data.entries.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod migrations;
pub mod query;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    Database, DatabaseConfig, Entry, EntryStore, NewEntry, ParseError, StorageError,
    StorageResult, TimeFilter,
};

pub use migrations::{DatabaseStatus, MigrationError, MigrationManager, MigrationOutcome};

pub use query::{GraphData, QueryError, QueryService};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
