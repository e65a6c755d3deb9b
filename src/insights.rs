//! Weekly mood insight.
//!
//! A small pure summary over the ledger's week window: how many moods
//! were logged and which mood came up most. Presentation decides when to
//! show it (gated on the user's `weekly_insights_enabled` setting);
//! scheduling is outside this crate.

use crate::models::{Mood, MoodEntry};

pub const WEEKLY_INSIGHT_TITLE: &str = "Weekly Wellness Insight";

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyInsight {
    pub mood_count: usize,
    /// Most frequent mood of the week; ties go to the earlier catalog
    /// entry. `None` when nothing was logged.
    pub dominant_mood: Option<Mood>,
}

impl WeeklyInsight {
    /// The insight copy, or `None` when there is nothing to say.
    pub fn message(&self) -> Option<String> {
        let dominant = self.dominant_mood?;
        Some(format!(
            "You logged {} moods this week! Your most common mood was {}. Keep it up! 💪",
            self.mood_count, dominant
        ))
    }
}

/// Summarize a week of entries, typically `MoodLedger::week_moods()`.
pub fn weekly_insight(entries: &[MoodEntry]) -> WeeklyInsight {
    let mut dominant: Option<(Mood, usize)> = None;
    for mood in Mood::ALL {
        let count = entries.iter().filter(|e| e.mood == mood).count();
        if count > 0 && dominant.map_or(true, |(_, best)| count > best) {
            dominant = Some((mood, count));
        }
    }

    WeeklyInsight {
        mood_count: entries.len(),
        dominant_mood: dominant.map(|(mood, _)| mood),
    }
}
