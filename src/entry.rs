use crate::store::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Remote record type for emoji entries.
pub const ENTRY_RECORD_TYPE: &str = "EmojiEntry";

/// The fixed glyph set the selection grids offer.
pub const AVAILABLE_EMOJIS: [&str; 5] = ["😀", "😎", "🐶", "🚀", "🍕"];

/// One emoji tap: the unit of data synced across devices. Immutable once
/// created; the only lifecycle transitions are created and deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiEntry {
    pub id: String,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
    pub device: String,
}

impl EmojiEntry {
    pub fn new(emoji: impl Into<String>, device: impl Into<String>) -> Self {
        EmojiEntry {
            id: Uuid::new_v4().to_string(),
            emoji: emoji.into(),
            timestamp: Utc::now(),
            device: device.into(),
        }
    }

    /// Hydrate from a remote record. Returns `None` when any of `emoji`,
    /// `timestamp`, `device` is absent or of the wrong field type; a
    /// malformed record is skipped by the caller, never a crash.
    pub fn from_record(record: &Record) -> Option<Self> {
        let emoji = record.get("emoji")?.as_text()?;
        let timestamp = record.get("timestamp")?.as_instant()?;
        let device = record.get("device")?.as_text()?;

        Some(EmojiEntry {
            id: record.key.clone(),
            emoji: emoji.to_string(),
            timestamp,
            device: device.to_string(),
        })
    }

    /// Serialize to the remote record shape. The record key embeds the
    /// entry id so repeated upserts are idempotent by identity.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(ENTRY_RECORD_TYPE, self.id.clone());
        record.set("emoji", FieldValue::Text(self.emoji.clone()));
        record.set("timestamp", FieldValue::Instant(self.timestamp));
        record.set("device", FieldValue::Text(self.device.clone()));
        record
    }
}
