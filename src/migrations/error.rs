//! Migration error types

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while changing the schema version
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Operation not valid in the current version state
    /// (e.g. rollback with nothing applied)
    #[error("{0}")]
    State(String),

    /// A step failed; its transaction was rolled back and the version is
    /// unchanged from before the step
    #[error("migration {version} ({name}) failed: {source}")]
    Step {
        version: u32,
        name: &'static str,
        #[source]
        source: StorageError,
    },

    /// Reading or writing the bookkeeping table failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for MigrationError {
    fn from(err: rusqlite::Error) -> Self {
        MigrationError::Storage(err.into())
    }
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;
