//! A collection of records mirrored to a single storage key.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use souq_core::Keyed;

use super::DurableStorage;

/// Loads and saves a `Vec<T>` as one JSON array under a fixed key.
///
/// `load` never fails: an absent key, an unreadable backend, or a corrupt
/// document all yield an empty collection. `save` failures are logged and
/// swallowed, so the in-memory state stays authoritative for the session.
pub struct PersistentCollectionStore<T> {
    storage: Arc<dyn DurableStorage>,
    key: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<T> PersistentCollectionStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a store to `key` in `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>, key: &'static str) -> Self {
        Self {
            storage,
            key,
            _records: PhantomData,
        }
    }

    /// The storage key this collection lives under.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Read the persisted collection.
    #[must_use]
    pub fn load(&self) -> Vec<T> {
        let raw = match self.storage.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Failed to read collection, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Discarding corrupt collection");
                Vec::new()
            }
        }
    }

    /// Replace the persisted collection with `records`.
    pub fn save(&self, records: &[T]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = self.key, error = %e, "Failed to encode collection");
                return;
            }
        };

        if let Err(e) = self.storage.set(self.key, &json) {
            tracing::warn!(key = self.key, error = %e, "Failed to persist collection");
        }
    }
}

impl<T> std::fmt::Debug for PersistentCollectionStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCollectionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Drop later records whose key was already seen, keeping the first.
#[must_use]
pub fn dedupe_by_key<T: Keyed>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.key().clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, keys};
    use souq_core::{FavoriteEntry, Item, ItemUuid, Price};

    fn item(uuid: &str) -> Item {
        Item {
            uuid: ItemUuid::new(uuid),
            title: format!("Item {uuid}"),
            price: Price::from(1000),
            collection: "Snacks".into(),
            image: String::new(),
        }
    }

    fn store() -> (Arc<dyn DurableStorage>, PersistentCollectionStore<FavoriteEntry>) {
        let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::default());
        let store = PersistentCollectionStore::new(Arc::clone(&storage), keys::FAVORITES);
        (storage, store)
    }

    #[test]
    fn test_absent_key_loads_empty() {
        let (_, store) = store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_document_loads_empty() {
        let (storage, store) = store();
        storage.set(keys::FAVORITES, "{not json").unwrap();
        assert!(store.load().is_empty());

        storage.set(keys::FAVORITES, "{\"uuid\":\"a\"}").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (_, store) = store();
        let records = vec![FavoriteEntry::from(item("a")), FavoriteEntry::from(item("b"))];

        store.save(&records);

        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut renamed = item("a");
        renamed.title = "Second copy".to_string();
        let records = vec![
            FavoriteEntry::from(item("a")),
            FavoriteEntry::from(item("b")),
            FavoriteEntry::from(renamed),
        ];

        let deduped = dedupe_by_key(records);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].item.title, "Item a");
    }
}
