//! Data Transfer Objects
//!
//! Request and response types for the API endpoints. Every response
//! carries an explicit `ok` flag; `message` is set on failure and on
//! commands that have something to report.

use serde::{Deserialize, Serialize};

use crate::migrations::MigrationOutcome;
use crate::query::GraphData;
use crate::storage::{Entry, NewEntry};

// ============================================
// COMMON
// ============================================

/// `{ok, message?}` envelope used by commands and by every error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

impl From<MigrationOutcome> for OpResponse {
    fn from(outcome: MigrationOutcome) -> Self {
        Self::success(outcome.summary())
    }
}

// ============================================
// ENTRY DTOs
// ============================================

/// Body of `POST /api/v1/entries`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub happy: i64,
    pub social: i64,
    pub energy: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreateEntryRequest> for NewEntry {
    fn from(req: CreateEntryRequest) -> Self {
        NewEntry {
            happy: req.happy,
            social: req.social,
            energy: req.energy,
            notes: req.notes,
        }
    }
}

/// Response of `POST /api/v1/entries`
#[derive(Debug, Clone, Serialize)]
pub struct CreateEntryResponse {
    pub ok: bool,
    pub message: String,
    pub entry: Entry,
}

impl CreateEntryResponse {
    pub fn created(entry: Entry) -> Self {
        Self {
            ok: true,
            message: "Entry created".to_string(),
            entry,
        }
    }
}

// ============================================
// GRAPH DTOs
// ============================================

/// Query string of `GET /api/v1/graph`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDataParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Response of `GET /api/v1/graph`
#[derive(Debug, Clone, Serialize)]
pub struct GraphDataResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub data: GraphData,
}

impl From<GraphData> for GraphDataResponse {
    fn from(data: GraphData) -> Self {
        Self { ok: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_response_omits_missing_message() {
        let json = serde_json::to_value(OpResponse {
            ok: true,
            message: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"ok": true}));
    }

    #[test]
    fn test_create_request_notes_optional() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"happy": 1, "social": 2, "energy": 3}"#).unwrap();
        let entry = NewEntry::from(req);
        assert_eq!(entry, NewEntry::new(1, 2, 3));
    }

    #[test]
    fn test_create_request_requires_metrics() {
        let result = serde_json::from_str::<CreateEntryRequest>(r#"{"happy": 1, "social": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_graph_response_shape() {
        let response = GraphDataResponse::from(GraphData {
            first_entry: None,
            last_entry: None,
            entries: Vec::new(),
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ok": true,
                "firstEntry": null,
                "lastEntry": null,
                "entries": []
            })
        );
    }
}
