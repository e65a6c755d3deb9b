use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Per-user notification preferences. A user without a stored row gets
/// these defaults: daily reminder on at 09:00, weekly insights on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub daily_reminder_enabled: bool,
    pub reminder_time: NaiveTime,
    pub weekly_insights_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            daily_reminder_enabled: true,
            reminder_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            weekly_insights_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Dark
    }
}

/// Per-user appearance preferences. `background_color` is an HSL triple
/// without the `hsl()` wrapper, as the presentation layer consumes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub theme: Theme,
    pub background_color: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            background_color: "222 28% 12%".to_string(),
        }
    }
}

/// Patch for `NotificationSettings`; only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationUpdate {
    pub daily_reminder_enabled: Option<bool>,
    pub reminder_time: Option<NaiveTime>,
    pub weekly_insights_enabled: Option<bool>,
}

/// Patch for `AppearanceSettings`; only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppearanceUpdate {
    pub theme: Option<Theme>,
    pub background_color: Option<String>,
}
