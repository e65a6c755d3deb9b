//! The mood ledger.
//!
//! Local-first: the on-device [`MoodCache`] holds one entry per calendar day
//! and is what every read serves from. Recording writes through to the
//! remote event history when a user is signed in; a remote failure degrades
//! the write to local-only and queues it in the cache's outbox for
//! [`flush_outbox`] to replay. [`hydrate`] runs the other direction, folding
//! remote history into days the cache is missing.
//!
//! [`flush_outbox`]: MoodLedger::flush_outbox
//! [`hydrate`]: MoodLedger::hydrate

use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CoreError, CoreResult};
use crate::events::WellnessEvent;
use crate::models::{Mood, MoodDraft, MoodEntry, MoodEventRow, PendingMoodWrite};
use crate::store::{decode_rows, MoodCache, SelectQuery};
use crate::SessionContext;

const MOOD_ENTRIES: &str = "mood_entries";

/// Days before today included in the week window, bounds inclusive.
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// How far a recorded mood travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// On device and in the remote event history.
    Synced,
    /// On device only: no user was signed in, or the remote write failed
    /// and the entry was queued for replay.
    LocalOnly,
}

impl RecordOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, RecordOutcome::Synced)
    }
}

/// Per-day mood store over an on-device cache with remote write-through.
pub struct MoodLedger {
    ctx: SessionContext,
    cache: MoodCache,
}

impl MoodLedger {
    pub fn new(ctx: SessionContext, cache: MoodCache) -> Self {
        Self { ctx, cache }
    }

    /// The caller's local calendar day. Day keys, the week window, and
    /// hydration all derive from this clock.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Record a mood for `draft.date`, replacing any entry already on that
    /// day. The cache write must succeed (its failure is fatal); the remote
    /// write is attempted only for a signed-in user and degrades to a queued
    /// replay on failure.
    pub async fn record_mood(&mut self, draft: MoodDraft) -> CoreResult<RecordOutcome> {
        draft
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let entry = draft.into_entry();
        let (date, mood) = (entry.date, entry.mood);

        self.cache.upsert(entry.clone());
        self.cache.persist()?;

        let outcome = match self.ctx.current_user() {
            Some(user) => self.sync_entry(user, entry).await?,
            None => RecordOutcome::LocalOnly,
        };

        self.ctx.events.publish(WellnessEvent::MoodRecorded {
            date,
            mood,
            cloud_synced: outcome.is_synced(),
        });

        Ok(outcome)
    }

    async fn sync_entry(&mut self, user: Uuid, entry: MoodEntry) -> CoreResult<RecordOutcome> {
        let recorded_at = Utc::now();
        let row = json!({
            "user_id": user,
            "mood": entry.mood,
            "note": entry.note,
            "created_at": recorded_at,
        });

        match self.ctx.remote.insert(MOOD_ENTRIES, row).await {
            Ok(_) => Ok(RecordOutcome::Synced),
            Err(e) => {
                tracing::warn!(error = %e, date = %entry.date, "cloud mood write failed, queueing for replay");
                self.cache.outbox_mut().push(PendingMoodWrite {
                    user_id: user,
                    date: entry.date,
                    mood: entry.mood,
                    color: entry.color,
                    emoji: entry.emoji,
                    note: entry.note,
                    recorded_at,
                    attempts: 1,
                });
                self.cache.persist()?;
                self.ctx
                    .events
                    .publish(WellnessEvent::CloudSyncFailed { date: entry.date });
                Ok(RecordOutcome::LocalOnly)
            }
        }
    }

    /// The entry recorded for `date`, if any. Cache-only, never remote.
    pub fn mood_on(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.cache.get(date)
    }

    pub fn today_mood(&self) -> Option<&MoodEntry> {
        self.mood_on(Self::today())
    }

    /// Entries from the last week, `today - 7 <= date <= today`. Order is
    /// not part of the contract.
    pub fn week_moods(&self) -> Vec<MoodEntry> {
        let today = Self::today();
        let start = today - Duration::days(WEEK_WINDOW_DAYS);
        self.cache.range(start, today).cloned().collect()
    }

    /// Queued writes awaiting replay, across all users of this device.
    pub fn pending_sync(&self) -> usize {
        self.cache.outbox().len()
    }

    /// Replay the signed-in user's queued writes in the order they were
    /// recorded, stopping at the first remote failure. Entries queued for
    /// other users stay put. Returns how many writes were replayed.
    pub async fn flush_outbox(&mut self) -> CoreResult<usize> {
        let Some(user) = self.ctx.current_user() else {
            return Ok(0);
        };

        let mut replayed = 0;
        let mut changed = false;
        let mut idx = 0;

        while idx < self.cache.outbox().len() {
            let pending = self.cache.outbox()[idx].clone();
            if pending.user_id != user {
                idx += 1;
                continue;
            }

            let row = json!({
                "user_id": pending.user_id,
                "mood": pending.mood,
                "note": pending.note,
                "created_at": pending.recorded_at,
            });
            match self.ctx.remote.insert(MOOD_ENTRIES, row).await {
                Ok(_) => {
                    self.cache.outbox_mut().remove(idx);
                    replayed += 1;
                    changed = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, date = %pending.date, attempts = pending.attempts + 1, "outbox replay failed, keeping entry queued");
                    self.cache.outbox_mut()[idx].attempts += 1;
                    changed = true;
                    break;
                }
            }
        }

        if changed {
            self.cache.persist()?;
        }
        self.ctx.events.publish(WellnessEvent::OutboxFlushed {
            replayed,
            remaining: self.cache.outbox().len(),
        });
        Ok(replayed)
    }

    /// Fold the signed-in user's most recent remote events into the cache.
    ///
    /// Fetches up to `limit` events newest-first; for each local calendar
    /// day the newest event decides it. Days the cache already holds are
    /// left alone (the device copy wins), and a deciding event with a label
    /// outside the catalog skips its day with a warning. Derived entries
    /// take the catalog color and emoji. Returns how many days were added.
    pub async fn hydrate(&mut self, limit: usize) -> CoreResult<usize> {
        let Some(user) = self.ctx.current_user() else {
            return Ok(0);
        };

        let rows = self
            .ctx
            .remote
            .select(
                MOOD_ENTRIES,
                SelectQuery::new()
                    .eq("user_id", user)
                    .order_desc("created_at")
                    .limit(limit),
            )
            .await?;
        let events = decode_rows::<MoodEventRow>(rows)?;

        let mut decided: HashSet<NaiveDate> = HashSet::new();
        let mut added = 0;
        for event in events {
            let date = event.created_at.with_timezone(&Local).date_naive();
            if !decided.insert(date) || self.cache.contains(date) {
                continue;
            }
            let mood = match event.mood.parse::<Mood>() {
                Ok(mood) => mood,
                Err(_) => {
                    tracing::warn!(label = %event.mood, %date, "skipping remote mood event with unknown label");
                    continue;
                }
            };
            self.cache.upsert(MoodEntry {
                date,
                mood,
                color: mood.color().to_string(),
                emoji: mood.emoji().to_string(),
                note: event.note,
            });
            added += 1;
        }

        if added > 0 {
            self.cache.persist()?;
        }
        Ok(added)
    }
}
