//! Favorites: a persisted set of items keyed by uuid.

use souq_core::{FavoriteEntry, Item, ItemUuid};

use crate::storage::{PersistentCollectionStore, dedupe_by_key};

/// Favorited items, held in memory and mirrored to durable storage.
#[derive(Debug)]
pub struct FavoritesEngine {
    entries: Vec<FavoriteEntry>,
    store: PersistentCollectionStore<FavoriteEntry>,
}

impl FavoritesEngine {
    /// Restore favorites from `store`.
    #[must_use]
    pub fn load(store: PersistentCollectionStore<FavoriteEntry>) -> Self {
        let entries = dedupe_by_key(store.load());
        Self { entries, store }
    }

    /// Favorited items, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    fn commit(&mut self, next: Vec<FavoriteEntry>) {
        self.store.save(&next);
        self.entries = next;
    }

    /// Add `item`. Adding an item that is already a favorite changes nothing.
    pub fn add_favorite(&mut self, item: Item) {
        if self.is_favorite(&item.uuid) {
            return;
        }
        let mut next = self.entries.clone();
        next.push(FavoriteEntry::from(item));
        self.commit(next);
    }

    /// Remove `uuid` from favorites.
    pub fn remove_favorite(&mut self, uuid: &ItemUuid) {
        let next = self
            .entries
            .iter()
            .filter(|e| &e.item.uuid != uuid)
            .cloned()
            .collect();
        self.commit(next);
    }

    /// Flip membership of `item`. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, item: Item) -> bool {
        if self.is_favorite(&item.uuid) {
            self.remove_favorite(&item.uuid);
            false
        } else {
            self.add_favorite(item);
            true
        }
    }

    /// Remove every favorite.
    pub fn clear_favorites(&mut self) {
        self.commit(Vec::new());
    }

    /// Whether `uuid` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, uuid: &ItemUuid) -> bool {
        self.entries.iter().any(|e| &e.item.uuid == uuid)
    }
}
