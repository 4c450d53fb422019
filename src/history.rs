//! Bounded, persisted log of successful calculations.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{HISTORY_KEY, Storage, StorageError};

/// Maximum number of entries kept; older ones are evicted.
pub const HISTORY_CAPACITY: usize = 20;

/// One successful calculation. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: f64,
    pub timestamp: String,
}

/// Newest-first history log.
///
/// Every mutation rewrites the whole persisted log. Write failures are
/// logged and otherwise ignored; the in-memory log stays authoritative.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    storage: Arc<dyn Storage>,
    clock: fn() -> String,
}

impl HistoryStore {
    /// Restore the log from `storage`.
    ///
    /// Missing, unreadable or malformed state yields an empty log.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            Ok(Some(json)) => parse_entries(&json),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read history: {}. Starting empty.", e);
                Vec::new()
            }
        };
        debug!(entries = entries.len(), "loaded history");

        Self {
            entries,
            storage,
            clock: local_timestamp,
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    /// Record a calculation as the newest entry.
    pub fn append(&mut self, expression: &str, result: f64) {
        let entry = HistoryEntry {
            expression: expression.to_string(),
            result,
            timestamp: (self.clock)(),
        };
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        self.save();
    }

    /// Drop every entry and remove the persisted log.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            warn!("Failed to remove history: {}", e);
        }
    }

    /// All entries, newest first.
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entry at `index`, where `0` is the newest.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Number of entries, at most [`HISTORY_CAPACITY`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            warn!("Failed to save history: {}", e);
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(HISTORY_KEY, &json)
    }
}

fn parse_entries(json: &str) -> Vec<HistoryEntry> {
    match serde_json::from_str::<Vec<HistoryEntry>>(json) {
        Ok(mut entries) => {
            entries.truncate(HISTORY_CAPACITY);
            entries
        }
        Err(e) => {
            warn!("Failed to parse history: {}. Starting empty.", e);
            Vec::new()
        }
    }
}

fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
