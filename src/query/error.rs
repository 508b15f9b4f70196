//! Query error types

use thiserror::Error;

use crate::storage::{ParseError, StorageError};

/// Errors that can occur while answering a graph query
#[derive(Error, Debug)]
pub enum QueryError {
    /// A caller-supplied bound could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
