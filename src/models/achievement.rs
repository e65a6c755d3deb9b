use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==== Criteria types ====
// The activity counter an achievement threshold is measured against.

pub const CRITERIA_MOOD_ENTRIES: &str = "mood_entries";
pub const CRITERIA_CALM_EXERCISES: &str = "calm_exercises";

/// A catalog achievement: a badge plus the activity threshold that earns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub badge_icon: String,
    pub badge_color: String,
    pub criteria_type: String,
    pub criteria_count: i64,
}

/// One user's standing against one achievement.
///
/// `earned_at: Some(_)` is the grant and is set exactly once; a row with
/// `earned_at: None` only tracks progress toward a threshold not yet
/// crossed. `progress` never decreases and is frozen once granted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAchievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub progress: i64,
    pub earned_at: Option<DateTime<Utc>>,
}

impl UserAchievement {
    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_only_row_is_not_earned() {
        let row = UserAchievement {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            achievement_id: Uuid::new_v4(),
            progress: 3,
            earned_at: None,
        };
        assert!(!row.is_earned());
    }

    #[test]
    fn test_row_deserializes_with_null_earned_at() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "achievement_id": Uuid::new_v4(),
            "progress": 2,
            "earned_at": null,
        });
        let row: UserAchievement = serde_json::from_value(json).unwrap();
        assert_eq!(row.progress, 2);
        assert!(row.earned_at.is_none());
    }
}
