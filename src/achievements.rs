//! The achievement engine.
//!
//! Turns activity counts into badge grants against the shared catalog.
//! A grant is at-most-once per user and achievement, `earned_at` is set
//! exactly once, and progress toward a locked badge never regresses. The
//! engine trusts only confirmed remote writes: in-memory standings change
//! after the store acknowledges, and unlocks are announced only then.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::events::WellnessEvent;
use crate::models::{Achievement, UserAchievement};
use crate::store::{decode_rows, SelectQuery, StoreError};
use crate::SessionContext;

const ACHIEVEMENTS: &str = "achievements";
const USER_ACHIEVEMENTS: &str = "user_achievements";

// Unique key on the standings collection.
const STANDING_KEY: &[&str] = &["user_id", "achievement_id"];

/// Grants and progress for one user over the achievement catalog.
pub struct AchievementEngine {
    ctx: SessionContext,
    achievements: Vec<Achievement>,
    user_achievements: Vec<UserAchievement>,
}

impl AchievementEngine {
    /// Load the catalog (ascending threshold order) and the signed-in
    /// user's standings. Either load failing is a hard error: evaluating
    /// against stale-empty standings could re-grant, so the engine refuses
    /// to start without them. No signed-in user means empty standings.
    pub async fn load(ctx: SessionContext) -> CoreResult<Self> {
        let rows = ctx
            .remote
            .select(ACHIEVEMENTS, SelectQuery::new().order_asc("criteria_count"))
            .await?;
        let achievements = decode_rows::<Achievement>(rows)?;

        let user_achievements = match ctx.current_user() {
            Some(user) => {
                let rows = ctx
                    .remote
                    .select(USER_ACHIEVEMENTS, SelectQuery::new().eq("user_id", user))
                    .await?;
                decode_rows(rows)?
            }
            None => Vec::new(),
        };

        tracing::debug!(
            catalog = achievements.len(),
            standings = user_achievements.len(),
            "achievement engine loaded"
        );

        Ok(Self {
            ctx,
            achievements,
            user_achievements,
        })
    }

    /// Grant every achievement of `criteria_type` whose threshold
    /// `current_count` reaches, in ascending threshold order, skipping
    /// those already earned. Returns the newly unlocked achievements.
    ///
    /// Repeated calls with the same or higher count grant nothing new. A
    /// failed grant write is skipped with a warning and the achievement
    /// stays eligible: the next count-driven call retries it naturally.
    /// With no signed-in user this is a no-op.
    pub async fn evaluate(&mut self, criteria_type: &str, current_count: i64) -> Vec<Achievement> {
        let Some(user) = self.ctx.current_user() else {
            return Vec::new();
        };

        let eligible: Vec<Achievement> = self
            .achievements
            .iter()
            .filter(|a| a.criteria_type == criteria_type && a.criteria_count <= current_count)
            .cloned()
            .collect();

        let mut unlocked = Vec::new();
        for achievement in eligible {
            if self.is_earned(achievement.id) {
                continue;
            }

            let row = json!({
                "user_id": user,
                "achievement_id": achievement.id,
                "progress": current_count,
                "earned_at": chrono::Utc::now(),
            });
            match self.write_standing(row).await {
                Ok(standing) => {
                    self.remember(standing);
                    self.ctx.events.publish(WellnessEvent::AchievementUnlocked {
                        achievement: achievement.clone(),
                    });
                    unlocked.push(achievement);
                }
                Err(e) => {
                    tracing::warn!(error = %e, achievement = %achievement.name, "grant write failed, leaving achievement locked");
                }
            }
        }

        if !unlocked.is_empty() {
            self.refresh_standings(user).await;
        }
        unlocked
    }

    /// Raise stored progress to `count` for every not-yet-earned
    /// achievement of `criteria_type` currently below it. Never grants,
    /// never lowers progress, never touches an earned achievement. Remote
    /// failures are warned and the old value kept; no signed-in user is a
    /// no-op.
    pub async fn update_progress(&mut self, criteria_type: &str, count: i64) {
        let Some(user) = self.ctx.current_user() else {
            return;
        };

        let behind: Vec<Uuid> = self
            .achievements
            .iter()
            .filter(|a| a.criteria_type == criteria_type)
            .filter(|a| match self.standing(a.id) {
                Some(s) => !s.is_earned() && s.progress < count,
                None => count > 0,
            })
            .map(|a| a.id)
            .collect();

        for achievement_id in behind {
            let row = json!({
                "user_id": user,
                "achievement_id": achievement_id,
                "progress": count,
            });
            match self.write_standing(row).await {
                Ok(standing) => self.remember(standing),
                Err(e) => {
                    tracing::warn!(error = %e, %achievement_id, "progress write failed, keeping previous value");
                }
            }
        }
    }

    /// Stored progress toward `achievement`, 0 before any recorded activity.
    pub fn progress_of(&self, achievement: &Achievement) -> i64 {
        self.standing(achievement.id).map_or(0, |s| s.progress)
    }

    pub fn is_earned(&self, achievement_id: Uuid) -> bool {
        self.standing(achievement_id).is_some_and(|s| s.is_earned())
    }

    pub fn earned_count(&self) -> usize {
        self.user_achievements
            .iter()
            .filter(|s| s.is_earned())
            .count()
    }

    /// The catalog, ascending by threshold.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn user_achievements(&self) -> &[UserAchievement] {
        &self.user_achievements
    }

    fn standing(&self, achievement_id: Uuid) -> Option<&UserAchievement> {
        self.user_achievements
            .iter()
            .find(|s| s.achievement_id == achievement_id)
    }

    /// Replace the in-memory standing for the row's achievement. Called
    /// only with store-confirmed rows.
    fn remember(&mut self, standing: UserAchievement) {
        match self
            .user_achievements
            .iter_mut()
            .find(|s| s.achievement_id == standing.achievement_id)
        {
            Some(existing) => *existing = standing,
            None => self.user_achievements.push(standing),
        }
    }

    async fn write_standing(&self, row: Value) -> Result<UserAchievement, StoreError> {
        let stored = self
            .ctx
            .remote
            .upsert(USER_ACHIEVEMENTS, STANDING_KEY, row)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Re-read standings after grants. Best-effort: the store already
    /// confirmed each grant, so a refresh failure keeps the in-memory set.
    async fn refresh_standings(&mut self, user: Uuid) {
        let refreshed = self
            .ctx
            .remote
            .select(USER_ACHIEVEMENTS, SelectQuery::new().eq("user_id", user))
            .await
            .and_then(decode_rows::<UserAchievement>);
        match refreshed {
            Ok(rows) => self.user_achievements = rows,
            Err(e) => {
                tracing::warn!(error = %e, "standings refresh after grant failed, keeping confirmed state");
            }
        }
    }
}
