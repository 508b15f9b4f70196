//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::time::Instant;

use crate::api::error::{ApiError, ApiResult};
use crate::migrations::MigrationManager;
use crate::query::QueryService;
use crate::storage::{Database, EntryStore};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Entry writes and reads
    pub entries: EntryStore,
    /// Schema version control
    pub migrations: MigrationManager,
    /// Chart queries
    pub queries: QueryService,
    /// API configuration
    pub config: ApiConfig,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wire every service to the same database handle
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let entries = EntryStore::new(db.clone());
        Self {
            queries: QueryService::new(entries.clone()),
            migrations: MigrationManager::new(db),
            entries,
            config,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Run a synchronous database call off the async runtime
pub(crate) async fn blocking<T, E, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Database task failed: {}", e)))?
        .map_err(Into::into)
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
