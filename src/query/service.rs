//! Graph data queries
//!
//! Answers the chart query: the entries inside a caller-chosen window plus
//! the first and last entry of the whole dataset, so the client knows how
//! much history exists regardless of the window it is showing.

use serde::Serialize;

use crate::query::error::QueryResult;
use crate::storage::{codec, Entry, EntryStore, TimeFilter};

/// Entries for one chart window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    /// Earliest entry in the table, independent of the window
    pub first_entry: Option<Entry>,
    /// Latest entry in the table, independent of the window
    pub last_entry: Option<Entry>,
    /// Entries inside the window, ascending by `created_at`
    pub entries: Vec<Entry>,
}

/// Composes the entry store with the timestamp codec
#[derive(Clone)]
pub struct QueryService {
    store: EntryStore,
}

impl QueryService {
    pub fn new(store: EntryStore) -> Self {
        Self { store }
    }

    /// Graph data for two optional ISO-8601 bounds.
    ///
    /// - both bounds: `from <= created_at <= to`
    /// - only `from`: `created_at > from`
    /// - only `to`: `created_at < to`
    /// - neither: every entry
    ///
    /// An unparseable bound fails the whole call.
    pub fn graph_data(&self, from: Option<&str>, to: Option<&str>) -> QueryResult<GraphData> {
        let from = codec::parse_external(from)?;
        let to = codec::parse_external(to)?;
        self.graph_data_for(TimeFilter::from_bounds(from, to))
    }

    /// Graph data for an already-built filter
    pub fn graph_data_for(&self, filter: TimeFilter) -> QueryResult<GraphData> {
        let entries = self.store.query_range(filter)?;
        let first_entry = self.store.first()?;
        let last_entry = self.store.last()?;

        tracing::debug!(filter = ?filter, entries = entries.len(), "Graph data query");

        Ok(GraphData {
            first_entry,
            last_entry,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::MigrationManager;
    use crate::query::QueryError;
    use crate::storage::{Database, NewEntry};
    use chrono::{DateTime, TimeZone, Utc};

    struct Fixture {
        service: QueryService,
        store: EntryStore,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        MigrationManager::new(db.clone()).migrate().unwrap();
        let store = EntryStore::new(db);
        Fixture {
            service: QueryService::new(store.clone()),
            store,
        }
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap()
    }

    fn wire(hour: u32) -> String {
        codec::to_wire(t(hour))
    }

    fn ids(data: &GraphData) -> Vec<i64> {
        data.entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_empty_database() {
        let f = fixture();
        let data = f.service.graph_data(None, None).unwrap();
        assert_eq!(data.first_entry, None);
        assert_eq!(data.last_entry, None);
        assert!(data.entries.is_empty());

        let json = serde_json::to_value(&data).unwrap();
        assert!(json["firstEntry"].is_null());
        assert!(json["lastEntry"].is_null());
        assert_eq!(json["entries"], serde_json::json!([]));
    }

    #[test]
    fn test_bound_semantics() {
        let f = fixture();
        let e1 = f.store.create_at(&NewEntry::new(10, 10, 10), t(1)).unwrap();
        let e2 = f.store.create_at(&NewEntry::new(20, 20, 20), t(2)).unwrap();
        let e3 = f.store.create_at(&NewEntry::new(30, 30, 30), t(3)).unwrap();

        let all = f.service.graph_data(None, None).unwrap();
        assert_eq!(ids(&all), vec![e1.id, e2.id, e3.id]);

        // Both bounds are inclusive
        let both = f
            .service
            .graph_data(Some(&wire(1)), Some(&wire(2)))
            .unwrap();
        assert_eq!(ids(&both), vec![e1.id, e2.id]);

        // A lone lower bound is strict
        let from_only = f.service.graph_data(Some(&wire(2)), None).unwrap();
        assert_eq!(ids(&from_only), vec![e3.id]);

        // A lone upper bound is strict and compares against `to`
        let to_only = f.service.graph_data(None, Some(&wire(3))).unwrap();
        assert_eq!(ids(&to_only), vec![e1.id, e2.id]);
    }

    #[test]
    fn test_first_and_last_ignore_window() {
        let f = fixture();
        let e1 = f.store.create_at(&NewEntry::new(10, 10, 10), t(1)).unwrap();
        f.store.create_at(&NewEntry::new(20, 20, 20), t(2)).unwrap();
        let e3 = f.store.create_at(&NewEntry::new(30, 30, 30), t(3)).unwrap();

        let data = f
            .service
            .graph_data(Some(&wire(2)), Some(&wire(2)))
            .unwrap();
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.first_entry, Some(e1));
        assert_eq!(data.last_entry, Some(e3));
    }

    #[test]
    fn test_window_entries_stay_inside_bounds() {
        let f = fixture();
        for hour in 0..24 {
            f.store
                .create_at(&NewEntry::new(50, 50, 50), t(hour))
                .unwrap();
        }

        let data = f
            .service
            .graph_data(Some(&wire(6)), Some(&wire(18)))
            .unwrap();
        assert_eq!(data.entries.len(), 13);
        assert!(data
            .entries
            .iter()
            .all(|e| e.created_at >= t(6) && e.created_at <= t(18)));
        assert!(data
            .entries
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_offset_bounds_are_normalized() {
        let f = fixture();
        let e = f.store.create_at(&NewEntry::new(1, 1, 1), t(5)).unwrap();

        // 07:00+02:00 is 05:00Z
        let data = f
            .service
            .graph_data(Some("2021-06-01T07:00:00+02:00"), Some("2021-06-01T07:00:00+02:00"))
            .unwrap();
        assert_eq!(ids(&data), vec![e.id]);
    }

    #[test]
    fn test_empty_bound_means_unbounded() {
        let f = fixture();
        f.store.create_at(&NewEntry::new(1, 1, 1), t(1)).unwrap();
        f.store.create_at(&NewEntry::new(2, 2, 2), t(2)).unwrap();

        let data = f.service.graph_data(Some(""), Some("")).unwrap();
        assert_eq!(data.entries.len(), 2);
    }

    #[test]
    fn test_bad_bound_fails_whole_call() {
        let f = fixture();
        f.store.create_at(&NewEntry::new(1, 1, 1), t(1)).unwrap();

        let err = f.service.graph_data(Some("yesterday"), None).unwrap_err();
        assert!(matches!(err, QueryError::Parse(_)));

        let err = f.service.graph_data(None, Some("2021-99-01")).unwrap_err();
        assert!(matches!(err, QueryError::Parse(_)));
    }

    #[test]
    fn test_unmigrated_database_is_storage_error() {
        let service = QueryService::new(EntryStore::new(Database::open_in_memory().unwrap()));
        let err = service.graph_data(None, None).unwrap_err();
        assert!(matches!(err, QueryError::Storage(_)));
    }

    #[test]
    fn test_wire_shape() {
        let f = fixture();
        f.store
            .create_at(&NewEntry::new(60, 40, 80).notes("gym"), t(9))
            .unwrap();

        let json = serde_json::to_value(f.service.graph_data(None, None).unwrap()).unwrap();
        assert_eq!(json["firstEntry"]["created_at"], "2021-06-01T09:00:00Z");
        assert_eq!(json["lastEntry"]["created_at"], "2021-06-01T09:00:00Z");
        assert_eq!(json["entries"][0]["notes"], "gym");
        assert_eq!(json["entries"][0]["happy"], 60);
    }
}
