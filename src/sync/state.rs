use crate::entry::EmojiEntry;
use chrono::{DateTime, Utc};

/// State the manager publishes to presentation layers. They read it
/// through watch receivers and call the manager's operations; nothing
/// else may mutate it.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Newest-first entry collection, the single source of truth for the UI.
    pub entries: Vec<EmojiEntry>,
    /// True for the duration of any in-flight remote operation.
    pub is_syncing: bool,
    /// Last-seen failure, overwritten on each new one.
    pub last_error: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
}

impl SyncState {
    pub fn set_syncing(&mut self) {
        self.is_syncing = true;
    }

    pub fn set_idle(&mut self) {
        self.is_syncing = false;
        self.last_sync = Some(Utc::now());
        self.last_error = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.is_syncing = false;
        self.last_error = Some(message);
    }

    /// Insert and restore the newest-first invariant. The sort is stable,
    /// so timestamp ties keep insertion order.
    pub fn push_sorted(&mut self, entry: EmojiEntry) {
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    /// Wholesale replacement after a fetch; sorts newest-first.
    pub fn replace_entries(&mut self, mut entries: Vec<EmojiEntry>) {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.entries = entries;
    }

    pub fn remove_entry(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
    }
}
