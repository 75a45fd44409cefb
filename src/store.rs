// src/store.rs
//! Durable watermark store: a small JSON file remembering the latest published
//! post and when the last successful run persisted. Loaded once at startup,
//! read-only during selection, written only after publishing.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::post::EnrichedPost;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoreState {
    #[serde(rename = "latestNews", default)]
    pub latest_news: Option<EnrichedPost>,
    /// Epoch milliseconds of the last persisting run; 0 means no prior run.
    #[serde(rename = "lastUpdate", default)]
    pub last_update: i64,
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl Store {
    /// Load the store from disk. A missing file means "no prior runs" and is
    /// not an error; anything else unreadable or unparsable is fatal so a
    /// corrupt store never silently resets the watermark.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str::<StoreState>(&data)
                .with_context(|| format!("store file {} is malformed", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no previous store; starting fresh");
                StoreState::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("could not access store at {}", path.display()))
            }
        };
        debug!(last_update = state.last_update, "store loaded");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// The boundary below which posts count as already published. `None`
    /// before the first persisting run.
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        let state = self.state.lock().expect("store mutex poisoned");
        if state.last_update == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(state.last_update)
    }

    /// Fold a published batch into the store and write it out. The
    /// maximum-dated post of the batch becomes `latestNews`; `now` becomes the
    /// new watermark. Empty batches leave the store untouched.
    pub fn update(&self, batch: &[EnrichedPost], now: DateTime<Utc>) -> Result<()> {
        let Some(latest) = batch.iter().max_by_key(|p| p.date) else {
            return Ok(());
        };

        let new_state = StoreState {
            latest_news: Some(latest.clone()),
            last_update: now.timestamp_millis(),
        };
        {
            let mut state = self.state.lock().expect("store mutex poisoned");
            *state = new_state.clone();
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating store directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&new_state).context("serializing store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing store to {}", self.path.display()))?;
        debug!(path = %self.path.display(), last_update = new_state.last_update, "store persisted");
        Ok(())
    }

    pub fn latest_news(&self) -> Option<EnrichedPost> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .latest_news
            .clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
