//! Per-user settings.
//!
//! Notification and appearance preferences live in their own remote
//! collections, one row per user. Settings are never load-bearing enough
//! to fail an action over: loading falls back to defaults on any remote
//! trouble, a first-time user gets a defaults row created best-effort,
//! and updates keep the in-memory value even when the save fails.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{
    AppearanceSettings, AppearanceUpdate, NotificationSettings, NotificationUpdate,
};
use crate::store::{SelectQuery, StoreError};
use crate::SessionContext;

const NOTIFICATION_SETTINGS: &str = "notification_settings";
const USER_SETTINGS: &str = "user_settings";

/// The signed-in user's preferences, held in memory and written through.
pub struct Settings {
    ctx: SessionContext,
    notifications: NotificationSettings,
    appearance: AppearanceSettings,
}

impl Settings {
    /// Load the user's settings rows, creating default rows for a
    /// first-time user. Infallible: remote failures degrade to in-memory
    /// defaults with a warning, and a signed-out session gets defaults
    /// without any remote traffic.
    pub async fn load(ctx: SessionContext) -> Self {
        let mut settings = Self {
            ctx,
            notifications: NotificationSettings::default(),
            appearance: AppearanceSettings::default(),
        };
        let Some(user) = settings.ctx.current_user() else {
            return settings;
        };

        match fetch_row::<NotificationSettings>(&settings.ctx, NOTIFICATION_SETTINGS, user).await {
            Ok(Some(stored)) => settings.notifications = stored,
            Ok(None) => {
                let row = notification_row(user, &settings.notifications);
                if let Err(e) = settings.ctx.remote.insert(NOTIFICATION_SETTINGS, row).await {
                    tracing::warn!(error = %e, "could not create default notification settings");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "notification settings load failed, using defaults");
            }
        }

        match fetch_row::<AppearanceSettings>(&settings.ctx, USER_SETTINGS, user).await {
            Ok(Some(stored)) => settings.appearance = stored,
            Ok(None) => {
                let row = appearance_row(user, &settings.appearance);
                if let Err(e) = settings.ctx.remote.insert(USER_SETTINGS, row).await {
                    tracing::warn!(error = %e, "could not create default appearance settings");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "appearance settings load failed, using defaults");
            }
        }

        settings
    }

    pub fn notifications(&self) -> &NotificationSettings {
        &self.notifications
    }

    pub fn appearance(&self) -> &AppearanceSettings {
        &self.appearance
    }

    /// Apply the patch in memory, then save. A failed save is warned and
    /// the merged value kept; with nobody signed in the whole update is a
    /// no-op.
    pub async fn update_notifications(&mut self, update: NotificationUpdate) {
        let Some(user) = self.ctx.current_user() else {
            return;
        };

        if let Some(enabled) = update.daily_reminder_enabled {
            self.notifications.daily_reminder_enabled = enabled;
        }
        if let Some(time) = update.reminder_time {
            self.notifications.reminder_time = time;
        }
        if let Some(enabled) = update.weekly_insights_enabled {
            self.notifications.weekly_insights_enabled = enabled;
        }

        let row = notification_row(user, &self.notifications);
        if let Err(e) = self
            .ctx
            .remote
            .upsert(NOTIFICATION_SETTINGS, &["user_id"], row)
            .await
        {
            tracing::warn!(error = %e, "notification settings save failed, keeping local value");
        }
    }

    /// Apply the patch in memory, then save; same degradation and no-op
    /// rules as [`update_notifications`](Self::update_notifications).
    pub async fn update_appearance(&mut self, update: AppearanceUpdate) {
        let Some(user) = self.ctx.current_user() else {
            return;
        };

        if let Some(theme) = update.theme {
            self.appearance.theme = theme;
        }
        if let Some(color) = update.background_color {
            self.appearance.background_color = color;
        }

        let row = appearance_row(user, &self.appearance);
        if let Err(e) = self
            .ctx
            .remote
            .upsert(USER_SETTINGS, &["user_id"], row)
            .await
        {
            tracing::warn!(error = %e, "appearance settings save failed, keeping local value");
        }
    }
}

async fn fetch_row<T: DeserializeOwned>(
    ctx: &SessionContext,
    collection: &str,
    user: Uuid,
) -> Result<Option<T>, StoreError> {
    let rows = ctx
        .remote
        .select(collection, SelectQuery::new().eq("user_id", user).limit(1))
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}

fn notification_row(user: Uuid, settings: &NotificationSettings) -> Value {
    json!({
        "user_id": user,
        "daily_reminder_enabled": settings.daily_reminder_enabled,
        "reminder_time": settings.reminder_time,
        "weekly_insights_enabled": settings.weekly_insights_enabled,
    })
}

fn appearance_row(user: Uuid, settings: &AppearanceSettings) -> Value {
    json!({
        "user_id": user,
        "theme": settings.theme,
        "background_color": settings.background_color,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveTime;

    use super::*;
    use crate::auth::SessionAuth;
    use crate::models::Theme;
    use crate::store::MemoryStore;

    fn ctx_for(store: Arc<MemoryStore>, user: Option<Uuid>) -> SessionContext {
        let auth = match user {
            Some(user) => SessionAuth::signed_in(user),
            None => SessionAuth::new(),
        };
        SessionContext::new(store, Arc::new(auth))
    }

    #[tokio::test]
    async fn test_first_time_user_gets_default_rows() {
        let store = Arc::new(MemoryStore::new());
        let settings = Settings::load(ctx_for(store.clone(), Some(Uuid::new_v4()))).await;

        assert_eq!(settings.notifications(), &NotificationSettings::default());
        assert_eq!(settings.appearance(), &AppearanceSettings::default());
        assert_eq!(store.rows(NOTIFICATION_SETTINGS).await.len(), 1);
        assert_eq!(store.rows(USER_SETTINGS).await.len(), 1);
    }

    #[tokio::test]
    async fn test_stored_rows_override_defaults() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store
            .seed(
                NOTIFICATION_SETTINGS,
                json!({
                    "user_id": user,
                    "daily_reminder_enabled": false,
                    "reminder_time": "20:30:00",
                    "weekly_insights_enabled": true,
                }),
            )
            .await;

        let settings = Settings::load(ctx_for(store, Some(user))).await;
        assert!(!settings.notifications().daily_reminder_enabled);
        assert_eq!(
            settings.notifications().reminder_time,
            NaiveTime::from_hms_opt(20, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_merges_only_supplied_fields() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mut settings = Settings::load(ctx_for(store.clone(), Some(user))).await;

        settings
            .update_notifications(NotificationUpdate {
                reminder_time: NaiveTime::from_hms_opt(7, 15, 0),
                ..Default::default()
            })
            .await;

        assert!(settings.notifications().daily_reminder_enabled);
        assert_eq!(
            settings.notifications().reminder_time,
            NaiveTime::from_hms_opt(7, 15, 0).unwrap()
        );

        // still one row per user after the write-through
        assert_eq!(store.rows(NOTIFICATION_SETTINGS).await.len(), 1);
        let row = store.rows(NOTIFICATION_SETTINGS).await.remove(0);
        assert_eq!(row["reminder_time"], "07:15:00");
        assert_eq!(row["daily_reminder_enabled"], true);
    }

    #[tokio::test]
    async fn test_load_degrades_to_defaults_on_remote_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_reads(true);

        let settings = Settings::load(ctx_for(store, Some(Uuid::new_v4()))).await;
        assert_eq!(settings.notifications(), &NotificationSettings::default());
        assert_eq!(settings.appearance(), &AppearanceSettings::default());
    }

    #[tokio::test]
    async fn test_update_keeps_merged_value_when_save_fails() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = Settings::load(ctx_for(store.clone(), Some(Uuid::new_v4()))).await;

        store.set_fail_writes(true);
        settings
            .update_appearance(AppearanceUpdate {
                theme: Some(Theme::Light),
                ..Default::default()
            })
            .await;

        assert_eq!(settings.appearance().theme, Theme::Light);
    }

    #[tokio::test]
    async fn test_signed_out_update_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = Settings::load(ctx_for(store.clone(), None)).await;

        settings
            .update_appearance(AppearanceUpdate {
                theme: Some(Theme::Light),
                background_color: Some("210 40% 8%".to_string()),
            })
            .await;
        settings
            .update_notifications(NotificationUpdate {
                daily_reminder_enabled: Some(false),
                ..Default::default()
            })
            .await;

        // neither the in-memory state nor the remote moved
        assert_eq!(settings.appearance(), &AppearanceSettings::default());
        assert_eq!(settings.notifications(), &NotificationSettings::default());
        assert!(store.rows(NOTIFICATION_SETTINGS).await.is_empty());
        assert!(store.rows(USER_SETTINGS).await.is_empty());
    }
}
