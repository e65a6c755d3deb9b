//! Class overview for teachers.
//!
//! Folds the most recent mood events across the whole class into one
//! summary per student, newest students (by latest entry) first. Only a
//! user with the teacher role may build it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::roles::{self, Role};
use crate::error::{CoreError, CoreResult};
use crate::models::MoodEventRow;
use crate::store::{decode_rows, SelectQuery};
use crate::SessionContext;

const MOOD_ENTRIES: &str = "mood_entries";
const PROFILES: &str = "profiles";

/// How many recent mood events the overview considers by default.
pub const DEFAULT_ENTRY_WINDOW: usize = 100;

/// Shown for students whose profile has no display name.
pub const ANONYMOUS_STUDENT: &str = "Anonymous Student";

/// One mood event as the dashboard shows it. The label stays raw text:
/// history may predate the current catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentMood {
    pub mood: String,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentMoodSummary {
    pub student_id: Uuid,
    pub student_name: String,
    /// This student's events within the window, newest first.
    pub recent_moods: Vec<StudentMood>,
    pub mood_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassOverview {
    /// One summary per student with at least one event in the window,
    /// ordered by most recent activity.
    pub students: Vec<StudentMoodSummary>,
    pub active_students: usize,
    pub total_entries: usize,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
}

/// Build the class overview from the `limit` most recent mood events.
/// Requires the teacher role; anyone else gets `Forbidden`.
pub async fn class_overview(ctx: &SessionContext, limit: usize) -> CoreResult<ClassOverview> {
    if roles::fetch_role(ctx).await != Role::Teacher {
        return Err(CoreError::Forbidden);
    }

    let rows = ctx
        .remote
        .select(
            MOOD_ENTRIES,
            SelectQuery::new().order_desc("created_at").limit(limit),
        )
        .await?;
    let events = decode_rows::<MoodEventRow>(rows)?;

    let rows = ctx.remote.select(PROFILES, SelectQuery::new()).await?;
    let names: HashMap<Uuid, String> = decode_rows::<ProfileRow>(rows)?
        .into_iter()
        .filter_map(|p| p.full_name.map(|name| (p.id, name)))
        .collect();

    let total_entries = events.len();
    let mut slot: HashMap<Uuid, usize> = HashMap::new();
    let mut students: Vec<StudentMoodSummary> = Vec::new();
    for event in events {
        let idx = *slot.entry(event.user_id).or_insert_with(|| {
            students.push(StudentMoodSummary {
                student_id: event.user_id,
                student_name: names
                    .get(&event.user_id)
                    .cloned()
                    .unwrap_or_else(|| ANONYMOUS_STUDENT.to_string()),
                recent_moods: Vec::new(),
                mood_count: 0,
            });
            students.len() - 1
        });
        let summary = &mut students[idx];
        summary.recent_moods.push(StudentMood {
            mood: event.mood,
            created_at: event.created_at,
            note: event.note,
        });
        summary.mood_count += 1;
    }

    Ok(ClassOverview {
        active_students: students.len(),
        total_entries,
        students,
    })
}
