//! The rolling log of saved exports.
//!
//! The core produces capped `{id, name, timestamp, encoded image}` entries;
//! persisting them in a client-side key-value store is an external concern.
//! Independent of undo/redo history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many saved exports the rolling log retains.
pub const MAX_SAVED_RECORDS: usize = 5;

/// Unique identifier for a saved export record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new unique record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One saved export, ready for the external key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedExportRecord {
    /// Unique record ID.
    pub id: RecordId,
    /// The form name the export came from.
    pub name: String,
    /// Export time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// The exported raster, base64-encoded.
    pub encoded_image: String,
}

impl SavedExportRecord {
    /// Create a record with a fresh ID.
    #[must_use]
    pub fn new(name: impl Into<String>, timestamp_ms: u64, encoded_image: String) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            timestamp_ms,
            encoded_image,
        }
    }
}

/// A capped rolling list of saved exports, oldest evicted on overflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordLog {
    entries: Vec<SavedExportRecord>,
}

impl RecordLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest once [`MAX_SAVED_RECORDS`] is
    /// exceeded.
    pub fn push(&mut self, record: SavedExportRecord) {
        self.entries.push(record);
        if self.entries.len() > MAX_SAVED_RECORDS {
            self.entries.remove(0);
        }
    }

    /// The retained records, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[SavedExportRecord] {
        &self.entries
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_caps_at_five() {
        let mut log = RecordLog::new();
        for i in 0..8_u64 {
            log.push(SavedExportRecord::new("intake", i, String::from("AAAA")));
        }
        assert_eq!(log.len(), MAX_SAVED_RECORDS);
        // The three oldest were evicted.
        assert_eq!(log.entries()[0].timestamp_ms, 3);
        assert_eq!(log.entries()[4].timestamp_ms, 7);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = SavedExportRecord::new("a", 0, String::new());
        let b = SavedExportRecord::new("b", 0, String::new());
        assert_ne!(a.id, b.id);
    }
}
