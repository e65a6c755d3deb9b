//! Activity counters feeding the achievement engine.
//!
//! The engine only ever sees integers; this module is where they come
//! from. Each counter is a user-scoped row count over the matching remote
//! collection, plus the write path for calm sessions (mood events are
//! written by the ledger).

use chrono::Utc;
use serde_json::json;

use crate::error::CoreResult;
use crate::models::{CRITERIA_CALM_EXERCISES, CRITERIA_MOOD_ENTRIES};
use crate::store::Filter;
use crate::SessionContext;

const MOOD_ENTRIES: &str = "mood_entries";
const CALM_SESSIONS: &str = "calm_sessions";

pub struct ActivityCounters {
    ctx: SessionContext,
}

impl ActivityCounters {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Mood events the signed-in user has logged, 0 when signed out.
    pub async fn mood_entries(&self) -> CoreResult<u64> {
        self.count(MOOD_ENTRIES).await
    }

    /// Calm exercise sessions the signed-in user has completed.
    pub async fn calm_sessions(&self) -> CoreResult<u64> {
        self.count(CALM_SESSIONS).await
    }

    /// The counter an achievement of `criteria_type` is measured against.
    /// Unknown types count 0.
    pub async fn count_for(&self, criteria_type: &str) -> CoreResult<u64> {
        match criteria_type {
            CRITERIA_MOOD_ENTRIES => self.mood_entries().await,
            CRITERIA_CALM_EXERCISES => self.calm_sessions().await,
            other => {
                tracing::debug!(criteria_type = other, "no counter for criteria type");
                Ok(0)
            }
        }
    }

    /// Record a completed calm exercise and return the updated session
    /// count. Signed out, nothing is recorded and the count stays 0.
    pub async fn log_calm_session(&self, exercise: &str, duration_secs: u32) -> CoreResult<u64> {
        let Some(user) = self.ctx.current_user() else {
            return Ok(0);
        };

        let row = json!({
            "user_id": user,
            "exercise": exercise,
            "duration_secs": duration_secs,
            "created_at": Utc::now(),
        });
        self.ctx.remote.insert(CALM_SESSIONS, row).await?;
        self.calm_sessions().await
    }

    async fn count(&self, collection: &str) -> CoreResult<u64> {
        let Some(user) = self.ctx.current_user() else {
            return Ok(0);
        };
        let count = self
            .ctx
            .remote
            .count(collection, &[Filter::eq("user_id", user)])
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::auth::SessionAuth;
    use crate::store::MemoryStore;

    fn counters_for(store: Arc<MemoryStore>, user: Option<Uuid>) -> ActivityCounters {
        let auth = match user {
            Some(user) => SessionAuth::signed_in(user),
            None => SessionAuth::new(),
        };
        ActivityCounters::new(SessionContext::new(store, Arc::new(auth)))
    }

    #[tokio::test]
    async fn test_counts_are_scoped_to_the_user() {
        let store = Arc::new(MemoryStore::new());
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        for user in [me, me, someone_else] {
            store
                .seed(MOOD_ENTRIES, json!({"user_id": user, "mood": "happy"}))
                .await;
        }

        let counters = counters_for(store, Some(me));
        assert_eq!(counters.mood_entries().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_signed_out_counts_zero_and_logs_nothing() {
        let store = Arc::new(MemoryStore::new());
        let counters = counters_for(store.clone(), None);

        assert_eq!(counters.mood_entries().await.unwrap(), 0);
        assert_eq!(counters.log_calm_session("box-breathing", 120).await.unwrap(), 0);
        assert!(store.rows(CALM_SESSIONS).await.is_empty());
    }

    #[tokio::test]
    async fn test_logging_calm_sessions_advances_the_count() {
        let store = Arc::new(MemoryStore::new());
        let counters = counters_for(store, Some(Uuid::new_v4()));

        assert_eq!(counters.log_calm_session("body-scan", 300).await.unwrap(), 1);
        assert_eq!(counters.log_calm_session("box-breathing", 60).await.unwrap(), 2);
        assert_eq!(counters.count_for(CRITERIA_CALM_EXERCISES).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_criteria_type_counts_zero() {
        let store = Arc::new(MemoryStore::new());
        let counters = counters_for(store, Some(Uuid::new_v4()));
        assert_eq!(counters.count_for("journal_pages").await.unwrap(), 0);
    }
}
