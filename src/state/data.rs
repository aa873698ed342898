/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the session state machine and the UI layer.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::media::EncodedImage;

/// One successful edit: the image that was sent and the image that came back
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub original: EncodedImage,
    pub result: EncodedImage,
    pub created_at: DateTime<Utc>,
}

/// Session-lifetime edit history, newest first
///
/// Entries are only ever prepended. Nothing is evicted.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    /// Record a new entry at the front
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
