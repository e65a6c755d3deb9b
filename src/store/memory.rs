//! In-memory [`RemoteStore`] for tests and embedded use.
//!
//! Mimics the hosted platform closely enough for the rest of the crate:
//! rows get v4 ids and `created_at` timestamps on insert, upserts merge the
//! supplied columns into the conflicting row, and selects filter, order and
//! limit. Reads and writes can be made to fail on demand so callers can
//! exercise their degraded paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Filter, RemoteStore, SelectQuery, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a synthetic service error.
    /// Reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail with a synthetic service error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Insert a row verbatim, without id/timestamp assignment or the
    /// failure flag. Test seeding only.
    pub async fn seed(&self, collection: &str, row: Value) {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(row);
    }

    /// Snapshot of a collection's rows, in insertion order.
    pub async fn rows(&self, collection: &str) -> Vec<Value> {
        let collections = self.collections.read().await;
        collections.get(collection).cloned().unwrap_or_default()
    }

    fn write_allowed(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                body: "injected write failure".into(),
            });
        }
        Ok(())
    }

    fn read_allowed(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                body: "injected read failure".into(),
            });
        }
        Ok(())
    }

    /// Server-assigned columns, only where the caller left them out.
    fn fill_defaults(row: &mut Value) {
        if let Value::Object(map) = row {
            map.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
            map.entry("created_at").or_insert_with(|| json!(Utc::now()));
        }
    }
}

/// The canonical text form a value takes in a query string; equality
/// filters compare against this.
fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(&f.column).is_some_and(|v| text_form(v) == f.value))
}

/// Numbers compare numerically and RFC3339 timestamps chronologically,
/// whatever their subsecond precision; everything else compares as text.
fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal);
    }
    let (a, b) = (text_form(a), text_form(b));
    match (DateTime::parse_from_rfc3339(&a), DateTime::parse_from_rfc3339(&b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(&b),
    }
}

#[async_trait::async_trait]
impl RemoteStore for MemoryStore {
    async fn insert(&self, collection: &str, mut row: Value) -> Result<Value, StoreError> {
        self.write_allowed()?;
        Self::fill_defaults(&mut row);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn upsert(
        &self,
        collection: &str,
        conflict_columns: &[&str],
        row: Value,
    ) -> Result<Value, StoreError> {
        self.write_allowed()?;

        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection.to_string()).or_default();

        let conflicting = if conflict_columns.is_empty() {
            None
        } else {
            rows.iter().position(|existing| {
                conflict_columns.iter().all(|col| {
                    match (existing.get(*col), row.get(*col)) {
                        (Some(a), Some(b)) => text_form(a) == text_form(b),
                        _ => false,
                    }
                })
            })
        };

        match conflicting {
            Some(i) => {
                // Merge: only the supplied columns change.
                if let (Value::Object(target), Value::Object(patch)) = (&mut rows[i], &row) {
                    for (key, value) in patch {
                        target.insert(key.clone(), value.clone());
                    }
                }
                Ok(rows[i].clone())
            }
            None => {
                let mut row = row;
                Self::fill_defaults(&mut row);
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn select(
        &self,
        collection: &str,
        query: SelectQuery,
    ) -> Result<Vec<Value>, StoreError> {
        self.read_allowed()?;

        let collections = self.collections.read().await;
        let mut rows: Vec<Value> = collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.read_allowed()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|rows| rows.iter().filter(|r| matches(r, filters)).count() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let stored = store
            .insert("mood_entries", json!({"mood": "happy"}))
            .await
            .unwrap();

        assert!(stored.get("id").and_then(|v| v.as_str()).is_some());
        assert!(stored.get("created_at").and_then(|v| v.as_str()).is_some());
        assert_eq!(stored["mood"], "happy");
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (user, n) in [("a", 3), ("a", 1), ("b", 9), ("a", 2)] {
            store.seed("rows", json!({"user_id": user, "n": n})).await;
        }

        let rows = store
            .select(
                "rows",
                SelectQuery::new().eq("user_id", "a").order_asc("n").limit(2),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["n"], 1);
        assert_eq!(rows[1]["n"], 2);
    }

    #[tokio::test]
    async fn test_select_orders_descending() {
        let store = MemoryStore::new();
        for n in [1, 3, 2] {
            store.seed("rows", json!({"n": n})).await;
        }

        let rows = store
            .select("rows", SelectQuery::new().order_desc("n"))
            .await
            .unwrap();
        let ns: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_select_orders_mixed_precision_timestamps() {
        let store = MemoryStore::new();
        for at in [
            "2025-06-01T10:00:00Z",
            "2025-06-01T10:00:00.500Z",
            "2025-06-01T09:59:59.999999Z",
        ] {
            store.seed("rows", json!({"created_at": at})).await;
        }

        let rows = store
            .select("rows", SelectQuery::new().order_desc("created_at"))
            .await
            .unwrap();
        let stamps: Vec<&str> = rows
            .iter()
            .map(|r| r["created_at"].as_str().unwrap())
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2025-06-01T10:00:00.500Z",
                "2025-06-01T10:00:00Z",
                "2025-06-01T09:59:59.999999Z",
            ]
        );
    }

    #[tokio::test]
    async fn test_select_missing_collection_is_empty_not_error() {
        let store = MemoryStore::new();
        let rows = store.select("nothing", SelectQuery::new()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_merges_supplied_columns_only() {
        let store = MemoryStore::new();
        let first = store
            .upsert(
                "standings",
                &["user_id", "achievement_id"],
                json!({"user_id": "u1", "achievement_id": "a1", "progress": 3}),
            )
            .await
            .unwrap();

        let merged = store
            .upsert(
                "standings",
                &["user_id", "achievement_id"],
                json!({"user_id": "u1", "achievement_id": "a1", "progress": 5, "earned_at": "2025-06-01T00:00:00Z"}),
            )
            .await
            .unwrap();

        // Same row, not a second one, with its original server-assigned id.
        assert_eq!(store.rows("standings").await.len(), 1);
        assert_eq!(merged["id"], first["id"]);
        assert_eq!(merged["progress"], 5);
        assert_eq!(merged["earned_at"], "2025-06-01T00:00:00Z");
        assert_eq!(merged["created_at"], first["created_at"]);
    }

    #[tokio::test]
    async fn test_upsert_without_conflict_inserts() {
        let store = MemoryStore::new();
        store
            .upsert("standings", &["user_id"], json!({"user_id": "u1", "progress": 1}))
            .await
            .unwrap();
        store
            .upsert("standings", &["user_id"], json!({"user_id": "u2", "progress": 1}))
            .await
            .unwrap();

        assert_eq!(store.rows("standings").await.len(), 2);
    }

    #[tokio::test]
    async fn test_count_applies_filters() {
        let store = MemoryStore::new();
        for user in ["a", "a", "b"] {
            store.seed("mood_entries", json!({"user_id": user})).await;
        }

        let count = store
            .count("mood_entries", &[Filter::eq("user_id", "a")])
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_write_failure_flag_spares_reads() {
        let store = MemoryStore::new();
        store.seed("rows", json!({"n": 1})).await;
        store.set_fail_writes(true);

        let err = store.insert("rows", json!({"n": 2})).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 503, .. }));
        assert!(store
            .upsert("rows", &["n"], json!({"n": 1, "m": 2}))
            .await
            .is_err());

        // Reads unaffected, and the failed writes left no trace.
        assert_eq!(store.rows("rows").await.len(), 1);
        assert_eq!(store.count("rows", &[]).await.unwrap(), 1);

        store.set_fail_writes(false);
        assert!(store.insert("rows", json!({"n": 2})).await.is_ok());
    }

    #[tokio::test]
    async fn test_read_failure_flag_spares_writes() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);

        assert!(store.insert("rows", json!({"n": 1})).await.is_ok());
        assert!(store.select("rows", SelectQuery::new()).await.is_err());
        assert!(store.count("rows", &[]).await.is_err());

        store.set_fail_reads(false);
        assert_eq!(store.select("rows", SelectQuery::new()).await.unwrap().len(), 1);
    }
}
