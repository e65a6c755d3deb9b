use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The closed mood catalog. Order is fixed and doubles as the tie-break
/// order wherever moods compete (weekly dominant mood).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Energetic,
    Sad,
    Anxious,
    Peaceful,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Energetic,
        Mood::Sad,
        Mood::Anxious,
        Mood::Peaceful,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Energetic => "Energetic",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Peaceful => "Peaceful",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Energetic => "⚡",
            Mood::Sad => "😔",
            Mood::Anxious => "😰",
            Mood::Peaceful => "🕊️",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Mood::Happy => "hsl(48 100% 70%)",
            Mood::Calm => "hsl(200 70% 70%)",
            Mood::Energetic => "hsl(30 95% 65%)",
            Mood::Sad => "hsl(240 50% 65%)",
            Mood::Anxious => "hsl(270 60% 70%)",
            Mood::Peaceful => "hsl(160 50% 70%)",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive label parsing. This is the single validation point for
/// "is this mood in the catalog" on every input path, including rows read
/// back from the remote store.
impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mood: {}", s))
    }
}

/// A mood logged for one calendar day, as held in the on-device cache.
///
/// `color` and `emoji` are the display attributes the caller supplied when
/// recording and are stored verbatim; they are not re-derived from the
/// catalog pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: Mood,
    pub color: String,
    pub emoji: String,
    pub note: Option<String>,
}

/// Input for recording a mood.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoodDraft {
    pub date: NaiveDate,
    pub mood: Mood,
    pub color: String,
    pub emoji: String,
    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: Option<String>,
}

impl MoodDraft {
    /// Draft for `date` carrying the catalog's display pairing for `mood`.
    pub fn from_catalog(date: NaiveDate, mood: Mood) -> Self {
        Self {
            date,
            mood,
            color: mood.color().to_string(),
            emoji: mood.emoji().to_string(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn into_entry(self) -> MoodEntry {
        MoodEntry {
            date: self.date,
            mood: self.mood,
            color: self.color,
            emoji: self.emoji,
            note: self.note,
        }
    }
}

/// A mood event whose remote write failed (or could not be attempted) and
/// is queued for replay. Keeps the original timestamp so the remote history
/// reflects when the mood was actually recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingMoodWrite {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood: Mood,
    pub color: String,
    pub emoji: String,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub attempts: u32,
}

/// A `mood_entries` row as the remote store returns it.
///
/// The remote side keeps every logged event with its timestamp; there is no
/// date column, so the calendar day is derived from `created_at` when the
/// event history is folded back into the day-keyed cache. The mood label
/// stays a raw string here: history can contain labels from older catalogs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEventRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_parses_case_insensitively() {
        assert_eq!("happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!("PEACEFUL".parse::<Mood>().unwrap(), Mood::Peaceful);
        assert_eq!("Energetic".parse::<Mood>().unwrap(), Mood::Energetic);
    }

    #[test]
    fn test_unknown_mood_is_rejected() {
        assert!("ecstatic".parse::<Mood>().is_err());
        assert!("".parse::<Mood>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_labels() {
        assert_eq!(serde_json::to_string(&Mood::Anxious).unwrap(), "\"anxious\"");
        let mood: Mood = serde_json::from_str("\"calm\"").unwrap();
        assert_eq!(mood, Mood::Calm);
    }

    #[test]
    fn test_catalog_pairings() {
        assert_eq!(Mood::Happy.emoji(), "😊");
        assert_eq!(Mood::Happy.color(), "hsl(48 100% 70%)");
        assert_eq!(Mood::Peaceful.emoji(), "🕊️");
        assert_eq!(Mood::ALL.len(), 6);
    }

    #[test]
    fn test_draft_note_length_is_bounded() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let ok = MoodDraft::from_catalog(date, Mood::Happy).with_note("a".repeat(5000));
        assert!(ok.validate().is_ok());

        let too_long = MoodDraft::from_catalog(date, Mood::Happy).with_note("a".repeat(5001));
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_draft_keeps_caller_display_attributes() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut draft = MoodDraft::from_catalog(date, Mood::Sad);
        draft.color = "hsl(0 0% 50%)".to_string();
        let entry = draft.into_entry();
        assert_eq!(entry.color, "hsl(0 0% 50%)");
        assert_eq!(entry.mood, Mood::Sad);
    }
}
