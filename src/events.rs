//! In-process event fan-out.
//!
//! Every state change a presentation collaborator might care about is
//! published here: moods recorded, cloud sync falling behind, achievements
//! unlocking. Subscribers come and go freely; publishing with zero
//! subscribers is not an error.

use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::models::{Achievement, Mood};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum WellnessEvent {
    /// A mood entry was recorded (or the day's entry replaced).
    MoodRecorded {
        date: NaiveDate,
        mood: Mood,
        /// False when the remote write was skipped or failed and the entry
        /// only reached the on-device cache.
        cloud_synced: bool,
    },
    /// The remote write for a recorded mood failed; the entry was queued
    /// for later replay.
    CloudSyncFailed { date: NaiveDate },
    /// Queued offline writes were replayed to the remote store.
    OutboxFlushed { replayed: usize, remaining: usize },
    /// An achievement crossed its threshold and the grant is durable.
    AchievementUnlocked { achievement: Achievement },
}

/// Cloneable handle over a broadcast channel. Cheap to pass around; all
/// clones publish into the same stream.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WellnessEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WellnessEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Lagging or absent subscribers never fail the
    /// operation that triggered the event.
    pub fn publish(&self, event: WellnessEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
