//! Schema migrations
//!
//! - **steps**: The ordered list of up/down steps
//! - **manager**: The version state machine (init, migrate, rollback, reset, status)
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use moodlog::migrations::MigrationManager;
//! use moodlog::storage::Database;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = MigrationManager::new(Database::open_in_memory()?);
//!     assert!(!manager.status().ok);
//!
//!     let outcome = manager.migrate()?;
//!     println!("{}", outcome.summary());
//!     assert!(manager.status().ok);
//!     Ok(())
//! }
//! ```

mod error;
mod manager;
mod steps;

pub use error::{MigrationError, MigrationResult};
pub use manager::{
    DatabaseStatus, HealthCode, MigrationManager, MigrationOutcome, MigrationRecord,
    BOOKKEEPING_TABLE,
};
pub use steps::{Migration, MIGRATIONS};
