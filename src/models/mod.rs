pub mod achievement;
pub mod mood;
pub mod settings;

pub use achievement::{
    Achievement, UserAchievement, CRITERIA_CALM_EXERCISES, CRITERIA_MOOD_ENTRIES,
};
pub use mood::{Mood, MoodDraft, MoodEntry, MoodEventRow, PendingMoodWrite};
pub use settings::{
    AppearanceSettings, AppearanceUpdate, NotificationSettings, NotificationUpdate, Theme,
};
