//! Shared fixtures for the integration tests.

use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use mindzone_core::auth::SessionAuth;
use mindzone_core::store::{MemoryStore, MoodCache};
use mindzone_core::SessionContext;

/// Route crate logs through the test harness. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mindzone_core=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Session context signed in as `user` over the given remote store.
pub fn signed_in_session(store: Arc<MemoryStore>, user: Uuid) -> SessionContext {
    SessionContext::new(store, Arc::new(SessionAuth::signed_in(user)))
}

/// Empty cache file in a fresh temp directory. Keep the guard alive for
/// the duration of the test.
pub fn temp_cache() -> (TempDir, MoodCache) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = MoodCache::load(dir.path().join("moods.json")).expect("Failed to open cache");
    (dir, cache)
}
