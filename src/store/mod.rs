//! Remote and local persistence.
//!
//! The hosted data platform is reached through the [`RemoteStore`] trait so
//! the rest of the crate never couples to a transport. [`rest::RestStore`]
//! talks to the real REST API; [`memory::MemoryStore`] backs tests and
//! embedded use. The on-device mood cache ([`local::MoodCache`]) is a plain
//! JSON file and deliberately not behind the trait: it is synchronous and
//! its failures are a different error class.

use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod local;
pub mod memory;
pub mod rest;

pub use local::MoodCache;
pub use memory::MemoryStore;
pub use rest::RestStore;

/// Errors from the remote-store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote store returned a non-2xx status code.
    #[error("Remote store error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A unique constraint rejected the write (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row did not match the expected shape.
    #[error("Failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Equality filter on one column. The value is carried in its query-string
/// text form; numbers and uuids compare by their canonical text.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select over one collection: conjunctive equality filters, at most one
/// ordering column, optional row limit.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Row-oriented access to the hosted data platform.
///
/// Rows cross this boundary as [`serde_json::Value`]; typed models
/// (de)serialize at the call sites. An empty result from [`select`] is the
/// ordinary "no matching row" condition, not an error.
///
/// [`select`]: RemoteStore::select
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a row and return the stored representation (server-assigned
    /// id and timestamps included).
    async fn insert(&self, collection: &str, row: Value) -> Result<Value, StoreError>;

    /// Insert or, when `conflict_columns` already match a row, merge the
    /// supplied columns into it. Columns absent from `row` keep their
    /// stored values.
    async fn upsert(
        &self,
        collection: &str,
        conflict_columns: &[&str],
        row: Value,
    ) -> Result<Value, StoreError>;

    async fn select(&self, collection: &str, query: SelectQuery)
        -> Result<Vec<Value>, StoreError>;

    /// Count rows matching the equality filters.
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError>;
}

/// Decode a batch of rows into a typed model.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::Decode))
        .collect()
}
