//! Per-id notes stored as a JSON object keyed by id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dexview_models::NoteRecord;
use tracing::warn;

use crate::backend::KeyValueStore;
use crate::error::{StoreError, StoreResult};

/// Storage key for the notes map.
pub const NOTES_KEY: &str = "pokemon-notes";

/// Notes keyed by catalog id.
pub type NotesMap = BTreeMap<u32, NoteRecord>;

/// Read all notes, treating missing or corrupt values as empty.
pub fn load(store: &dyn KeyValueStore) -> NotesMap {
    match store.get(NOTES_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "stored notes are corrupt; using empty map");
            NotesMap::new()
        }),
        Ok(None) => NotesMap::new(),
        Err(err) => {
            warn!(error = %err, "failed to read notes; using empty map");
            NotesMap::new()
        }
    }
}

/// Persist the whole map.
///
/// # Errors
///
/// Returns [`StoreError::Serde`] or the backend failure.
pub fn save(store: &dyn KeyValueStore, notes: &NotesMap) -> StoreResult<()> {
    let encoded = serde_json::to_string(notes).map_err(|source| StoreError::Serde {
        key: NOTES_KEY.to_string(),
        source,
    })?;
    store.set(NOTES_KEY, &encoded)
}

/// Apply a write: trimmed text replaces the note, blank text deletes it.
///
/// Returns the stored record, or `None` when the note was deleted.
pub fn apply(notes: &mut NotesMap, id: u32, text: &str, now: DateTime<Utc>) -> Option<NoteRecord> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        notes.remove(&id);
        return None;
    }
    let record = NoteRecord {
        id,
        text: trimmed.to_string(),
        updated_at: now,
    };
    notes.insert(id, record.clone());
    Some(record)
}
