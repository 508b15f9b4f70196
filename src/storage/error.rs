//! Storage layer error types
//!
//! Defines all errors that can occur while reading or writing entries.

use thiserror::Error;

use crate::storage::codec::ParseError;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite reported a failure (missing table, constraint violation, ...)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry rejected before reaching the database
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// A stored value could not be decoded (e.g. a malformed `created_at`)
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<ParseError> for StorageError {
    fn from(err: ParseError) -> Self {
        StorageError::Corruption(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
