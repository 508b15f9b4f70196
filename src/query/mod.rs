//! Moodlog query layer
//!
//! Turns the externally supplied `from`/`to` strings of a chart request
//! into a [`TimeFilter`](crate::storage::TimeFilter) and gathers the
//! matching entries together with the dataset's overall span.
//!
//! ```text
//! "2021-06-01T07:00:00+02:00" ──parse_external──▶ DateTime<Utc>
//!                                                     │
//!                          TimeFilter::from_bounds ◀──┘
//!                                    │
//!            EntryStore::query_range + first + last ──▶ GraphData
//! ```

mod error;
mod service;

pub use error::{QueryError, QueryResult};
pub use service::{GraphData, QueryService};
