//! Favorites list encoding and set operations.
//!
//! Stored under [`FAVORITES_KEY`] as a JSON array in insertion order.

use dexview_models::FavoriteRecord;
use tracing::warn;

use crate::backend::KeyValueStore;
use crate::error::{StoreError, StoreResult};

/// Storage key for the favorites array.
pub const FAVORITES_KEY: &str = "pokemon-favorites";

/// Read favorites, treating missing or corrupt values as empty.
pub fn load(store: &dyn KeyValueStore) -> Vec<FavoriteRecord> {
    let raw = match store.get(FAVORITES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "failed to read favorites; using empty list");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<FavoriteRecord>>(&raw) {
        Ok(records) => dedup(records),
        Err(err) => {
            warn!(error = %err, "stored favorites are corrupt; using empty list");
            Vec::new()
        }
    }
}

/// Persist `records` in order.
///
/// # Errors
///
/// Returns [`StoreError::Serde`] or the backend failure.
pub fn save(store: &dyn KeyValueStore, records: &[FavoriteRecord]) -> StoreResult<()> {
    let encoded = serde_json::to_string(records).map_err(|source| StoreError::Serde {
        key: FAVORITES_KEY.to_string(),
        source,
    })?;
    store.set(FAVORITES_KEY, &encoded)
}

/// Insert `record`, replacing an existing entry with the same id in place.
pub fn upsert(records: &mut Vec<FavoriteRecord>, record: FavoriteRecord) {
    if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
        *existing = record;
    } else {
        records.push(record);
    }
}

/// Remove the entry for `id`; returns whether one existed.
pub fn remove(records: &mut Vec<FavoriteRecord>, id: u32) -> bool {
    let before = records.len();
    records.retain(|record| record.id != id);
    records.len() != before
}

/// Ids in insertion order.
#[must_use]
pub fn ids(records: &[FavoriteRecord]) -> Vec<u32> {
    records.iter().map(|record| record.id).collect()
}

fn dedup(records: Vec<FavoriteRecord>) -> Vec<FavoriteRecord> {
    let mut unique: Vec<FavoriteRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !unique.iter().any(|existing| existing.id == record.id) {
            unique.push(record);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn record(id: u32, name: &str) -> FavoriteRecord {
        FavoriteRecord {
            id,
            name: name.to_string(),
            image_url: None,
            added_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn upsert_keeps_ids_unique_and_position_stable() {
        let mut records = vec![record(1, "bulbasaur"), record(4, "charmander")];
        upsert(&mut records, record(1, "bulbasaur-renamed"));
        upsert(&mut records, record(7, "squirtle"));

        assert_eq!(ids(&records), vec![1, 4, 7]);
        assert_eq!(records[0].name, "bulbasaur-renamed");
        assert!(remove(&mut records, 4));
        assert!(!remove(&mut records, 4));
        assert_eq!(ids(&records), vec![1, 7]);
    }

    #[test]
    fn corrupt_or_missing_values_read_as_empty() {
        let store = MemoryStore::new();
        assert!(load(&store).is_empty());

        store.set(FAVORITES_KEY, "{not json").expect("set");
        assert!(load(&store).is_empty());
    }

    #[test]
    fn stored_array_uses_camel_case_and_drops_duplicates() {
        let store = MemoryStore::new();
        store
            .set(
                FAVORITES_KEY,
                r#"[{"id":25,"name":"pikachu","imageUrl":"x.png","addedAt":"2024-01-01T00:00:00Z"},
                    {"id":25,"name":"dup","addedAt":"2024-01-02T00:00:00Z"}]"#,
            )
            .expect("set");

        let records = load(&store);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_url.as_deref(), Some("x.png"));

        save(&store, &records).expect("save");
        let raw = store.get(FAVORITES_KEY).expect("get").expect("value");
        assert!(raw.contains("\"imageUrl\""));
        assert!(raw.contains("\"addedAt\""));
    }
}
