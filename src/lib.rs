//! Client-side core for a student wellness app.
//!
//! Two components carry the real logic. [`MoodLedger`] keeps the per-day
//! mood record: the on-device cache is the source of truth for what the
//! user sees today, the hosted remote store keeps the full event history,
//! and the ledger reconciles the two — write-through with an offline
//! outbox in one direction, [`hydrate`] in the other.
//! [`AchievementEngine`] turns accumulated activity counts into badge
//! grants: at most one grant per user and achievement, monotone progress
//! toward locked badges, and unlocks announced only once they are durable.
//!
//! Around them sit the surfaces the app needs: activity counters feeding
//! the engine, per-user settings, the weekly insight summary, and the
//! teacher's class overview. Everything acts through a [`SessionContext`]
//! handed in explicitly — the remote store and the session identity are
//! trait objects, so tests and embedders swap in
//! [`store::MemoryStore`] / [`auth::SessionAuth`] without touching the
//! components themselves. State changes fan out on the context's
//! [`EventBus`] for whatever presentation layer is attached.
//!
//! [`hydrate`]: MoodLedger::hydrate

use std::sync::Arc;

use uuid::Uuid;

pub mod achievements;
pub mod activity;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod settings;
pub mod store;

pub use achievements::AchievementEngine;
pub use activity::ActivityCounters;
pub use auth::AuthProvider;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use events::{EventBus, WellnessEvent};
pub use ledger::{MoodLedger, RecordOutcome};
pub use models::{Achievement, Mood, MoodDraft, MoodEntry, UserAchievement};
pub use store::RemoteStore;

/// Everything a component needs to act for one session: the remote store,
/// the session identity, and the event bus. Cloneable and passed explicitly
/// into every constructor; nothing in this crate reads ambient globals.
#[derive(Clone)]
pub struct SessionContext {
    pub remote: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub events: EventBus,
}

impl SessionContext {
    pub fn new(remote: Arc<dyn RemoteStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            remote,
            auth,
            events: EventBus::new(),
        }
    }

    /// The signed-in user, or `None`.
    pub fn current_user(&self) -> Option<Uuid> {
        self.auth.current_user()
    }

    /// Subscribe to state-change events published by components using this
    /// context.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<WellnessEvent> {
        self.events.subscribe()
    }
}
