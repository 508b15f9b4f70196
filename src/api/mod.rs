//! Moodlog REST API
//!
//! HTTP API layer for Moodlog, built with Axum. Every response carries an
//! explicit `ok` flag; failures answer `{ok: false, message}`.
//!
//! # Endpoints
//!
//! ## Entries
//! - `POST /api/v1/entries` - Log a mood entry
//!
//! ## Graph
//! - `GET /api/v1/graph?from=&to=` - Entries in a window plus the dataset span
//!
//! ## Migrations
//! - `GET /api/v1/status` - Schema health
//! - `POST /api/v1/migrations/init` - Initialise the schema
//! - `POST /api/v1/migrations/migrate` - Apply pending steps
//! - `POST /api/v1/migrations/rollback` - Undo the current step
//! - `POST /api/v1/migrations/reset` - Undo every step
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//!
//! # Example
//!
//! ```rust,ignore
//! use moodlog::api::{serve, ApiConfig, AppState};
//! use moodlog::storage::{Database, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(&DatabaseConfig::new("moodlog.db"))?;
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(db, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(routes::health::database_status))
        .route("/graph", get(routes::graph::graph_data))
        .route("/entries", post(routes::entries::create_entry))
        .route("/migrations/init", post(routes::migrations::init))
        .route("/migrations/migrate", post(routes::migrations::migrate))
        .route("/migrations/rollback", post(routes::migrations::rollback))
        .route("/migrations/reset", post(routes::migrations::reset));

    let health_routes = Router::new().route("/live", get(routes::health::liveness));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Moodlog API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Moodlog API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, DatabaseConfig, EntryStore, NewEntry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, AppState) {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::new(db, ApiConfig::default());
        (build_router(state.clone()), state)
    }

    async fn migrated_app() -> (Router, AppState) {
        let (app, state) = create_test_app();
        let (status, _) = send(&app, "POST", "/api/v1/migrations/migrate", None).await;
        assert_eq!(status, StatusCode::OK);
        (app, state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _state) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_before_and_after_migrate() {
        let (app, _state) = create_test_app();

        let (status, body) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "DB_NOT_INITIALISED");
        assert!(body["message"].is_string());

        let (status, body) = send(&app, "POST", "/api/v1/migrations/migrate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (_, body) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["version"], 1);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (app, _state) = create_test_app();

        let (first, _) = send(&app, "POST", "/api/v1/migrations/init", None).await;
        let (second, body) = send(&app, "POST", "/api/v1/migrations/init", None).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "Database already at version 1");
    }

    #[tokio::test]
    async fn test_rollback_without_migrations_is_conflict() {
        let (app, _state) = create_test_app();

        let (status, body) = send(&app, "POST", "/api/v1/migrations/rollback", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["ok"], false);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migrate_rollback_migrate() {
        let (app, _state) = migrated_app().await;

        let (status, _) = send(&app, "POST", "/api/v1/migrations/rollback", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(body["ok"], false);

        let (status, _) = send(&app, "POST", "/api/v1/migrations/migrate", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_reset_uninitialised_is_ok() {
        let (app, _state) = create_test_app();

        let (status, body) = send(&app, "POST", "/api/v1/migrations/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_create_entry() {
        let (app, state) = migrated_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/entries",
            Some(r#"{"happy": 70, "social": 40, "energy": 55, "notes": "walk"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "Entry created");
        assert_eq!(body["entry"]["happy"], 70);
        assert_eq!(body["entry"]["notes"], "walk");
        assert!(body["entry"]["created_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(state.entries.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_entry_invalid_json() {
        let (app, _state) = migrated_app().await;

        let (status, body) = send(&app, "POST", "/api/v1/entries", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_create_entry_missing_field() {
        let (app, state) = migrated_app().await;

        let (status, body) =
            send(&app, "POST", "/api/v1/entries", Some(r#"{"happy": 1, "social": 2}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(state.entries.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_entry_out_of_range() {
        let (app, state) = migrated_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/entries",
            Some(r#"{"happy": 101, "social": 2, "energy": 3}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(body["message"].as_str().unwrap().contains("happy"));
        assert_eq!(state.entries.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_entry_before_migrate() {
        let (app, _state) = create_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/entries",
            Some(r#"{"happy": 1, "social": 2, "energy": 3}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_graph_empty() {
        let (app, _state) = migrated_app().await;

        let (status, body) = send(&app, "GET", "/api/v1/graph", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert!(body["firstEntry"].is_null());
        assert!(body["lastEntry"].is_null());
        assert_eq!(body["entries"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_graph_window() {
        let (app, state) = migrated_app().await;
        for hour in [1, 2, 3] {
            let at = Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap();
            state
                .entries
                .create_at(&NewEntry::new(10, 20, 30), at)
                .unwrap();
        }

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/graph?from=2021-06-01T01:00:00Z&to=2021-06-01T02:00:00Z",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().unwrap().len(), 2);
        assert_eq!(body["firstEntry"]["created_at"], "2021-06-01T01:00:00Z");
        assert_eq!(body["lastEntry"]["created_at"], "2021-06-01T03:00:00Z");

        let (_, body) = send(&app, "GET", "/api/v1/graph?from=2021-06-01T02:00:00Z", None).await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["created_at"], "2021-06-01T03:00:00Z");
    }

    #[tokio::test]
    async fn test_graph_bad_bound() {
        let (app, _state) = migrated_app().await;

        let (status, body) = send(&app, "GET", "/api/v1/graph?from=not-a-date", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_rollback_drops_populated_table() {
        let (app, state) = migrated_app().await;
        send(
            &app,
            "POST",
            "/api/v1/entries",
            Some(r#"{"happy": 1, "social": 2, "energy": 3}"#),
        )
        .await;

        let (status, _) = send(&app, "POST", "/api/v1/migrations/rollback", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.entries.count().is_err());

        let (status, body) = send(&app, "GET", "/api/v1/graph", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path().join("moodlog.db"));

        {
            let state = AppState::new(Database::open(&config).unwrap(), ApiConfig::default());
            let app = build_router(state);
            send(&app, "POST", "/api/v1/migrations/migrate", None).await;
            let (status, _) = send(
                &app,
                "POST",
                "/api/v1/entries",
                Some(r#"{"happy": 5, "social": 6, "energy": 7}"#),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let store = EntryStore::new(Database::open(&config).unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }
}
