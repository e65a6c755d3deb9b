//! On-device mood cache.
//!
//! One JSON file holds everything the device owns: the day-keyed mood map
//! (one entry per calendar day, last write wins) and the outbox of remote
//! writes awaiting replay. Loads tolerate a missing file; any other I/O or
//! parse problem is a local-resource failure and fatal to the operation
//! that needed it. Writes go through a sibling temp file and an atomic
//! rename so a crash never leaves a half-written cache behind.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::models::{MoodEntry, PendingMoodWrite};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    moods: BTreeMap<NaiveDate, MoodEntry>,
    #[serde(default)]
    outbox: Vec<PendingMoodWrite>,
}

#[derive(Debug)]
pub struct MoodCache {
    path: PathBuf,
    data: CacheFile,
}

impl MoodCache {
    /// Open the cache at `path`. A missing file is an empty cache; a file
    /// that cannot be read or parsed surfaces as [`CoreError::Cache`].
    pub fn load(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| CoreError::cache(format!("read {}", path.display()), e))?;
            serde_json::from_str(&content)
                .map_err(|e| CoreError::cache(format!("parse {}", path.display()), e))?
        } else {
            CacheFile::default()
        };
        Ok(Self { path, data })
    }

    /// Open the cache at the platform default location.
    pub fn load_default() -> CoreResult<Self> {
        Self::load(Config::default_cache_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.data.moods.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.data.moods.contains_key(&date)
    }

    /// Set the entry for its date, replacing any prior entry whole.
    pub fn upsert(&mut self, entry: MoodEntry) {
        self.data.moods.insert(entry.date, entry);
    }

    /// Entries with `start <= date <= end`, ascending by date.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &MoodEntry> {
        self.data.moods.range(start..=end).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.data.moods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.moods.is_empty()
    }

    /// Queued remote writes, oldest first.
    pub fn outbox(&self) -> &[PendingMoodWrite] {
        &self.data.outbox
    }

    pub(crate) fn outbox_mut(&mut self) -> &mut Vec<PendingMoodWrite> {
        &mut self.data.outbox
    }

    /// Write the cache to disk: serialize, write a sibling `.tmp` file,
    /// fsync, rename over the real file.
    pub fn persist(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::cache(format!("create {}", parent.display()), e))?;
        }

        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| CoreError::cache("serialize mood cache", e))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| CoreError::cache(format!("create {}", temp_path.display()), e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| CoreError::cache(format!("write {}", temp_path.display()), e))?;
        temp_file
            .sync_all()
            .map_err(|e| CoreError::cache(format!("sync {}", temp_path.display()), e))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| CoreError::cache(format!("rename into {}", self.path.display()), e))?;
        Ok(())
    }
}
