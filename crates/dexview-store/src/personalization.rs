//! Favorites, notes, and theme over a [`KeyValueStore`].
//!
//! # Design
//! - Favorites are also held in memory so membership checks never touch the
//!   backend; every mutation re-reads storage first so writes from other
//!   contexts are not clobbered.
//! - Persistence is best-effort: write failures are logged and the in-memory
//!   view still reflects the change.
//! - [`PersonalizationStore::spawn_sync`] reloads the in-memory view when
//!   another context writes the favorites key.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use dexview_models::{FavoriteDraft, FavoriteRecord, NoteRecord, Theme};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::KeyValueStore;
use crate::events::PersonalizationEvent;
use crate::{favorites, notes, theme};

const EVENT_CAPACITY: usize = 32;

/// Client-local personalization state.
pub struct PersonalizationStore {
    backend: Arc<dyn KeyValueStore>,
    favorites: Mutex<Vec<FavoriteRecord>>,
    events: broadcast::Sender<PersonalizationEvent>,
}

impl std::fmt::Debug for PersonalizationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalizationStore")
            .field("favorites", &self.favorite_ids())
            .finish_non_exhaustive()
    }
}

impl PersonalizationStore {
    /// Load the current favorites from `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let loaded = favorites::load(backend.as_ref());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            favorites: Mutex::new(loaded),
            events,
        }
    }

    /// Observe changes made through this store or synced from other contexts.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PersonalizationEvent> {
        self.events.subscribe()
    }

    /// Favorites in insertion order.
    #[must_use]
    pub fn favorites(&self) -> Vec<FavoriteRecord> {
        self.lock_favorites().clone()
    }

    /// Favorite ids in insertion order.
    #[must_use]
    pub fn favorite_ids(&self) -> Vec<u32> {
        favorites::ids(&self.lock_favorites())
    }

    /// Whether `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: u32) -> bool {
        self.lock_favorites().iter().any(|record| record.id == id)
    }

    /// Add a favorite, replacing any entry with the same id.
    pub fn add_favorite(&self, draft: FavoriteDraft) -> FavoriteRecord {
        let record = draft.into_record(Utc::now());
        let stored = record.clone();
        self.mutate_favorites(|records| favorites::upsert(records, record));
        stored
    }

    /// Remove a favorite; returns whether it existed.
    pub fn remove_favorite(&self, id: u32) -> bool {
        let mut removed = false;
        self.mutate_favorites(|records| removed = favorites::remove(records, id));
        removed
    }

    /// Flip membership for `draft.id`; returns whether it is now a favorite.
    pub fn toggle_favorite(&self, draft: FavoriteDraft) -> bool {
        let mut now_favorite = false;
        self.mutate_favorites(|records| {
            if favorites::remove(records, draft.id) {
                now_favorite = false;
            } else {
                favorites::upsert(records, draft.into_record(Utc::now()));
                now_favorite = true;
            }
        });
        now_favorite
    }

    /// Remove every favorite.
    pub fn clear_favorites(&self) {
        let mut current = self.lock_favorites();
        if let Err(err) = self.backend.remove(favorites::FAVORITES_KEY) {
            warn!(error = %err, "failed to clear stored favorites");
        }
        current.clear();
        drop(current);
        self.publish(PersonalizationEvent::FavoritesChanged { ids: Vec::new() });
    }

    /// Re-read favorites from storage.
    pub fn reload_favorites(&self) {
        let loaded = favorites::load(self.backend.as_ref());
        let ids = favorites::ids(&loaded);
        *self.lock_favorites() = loaded;
        debug!(count = ids.len(), "favorites reloaded from storage");
        self.publish(PersonalizationEvent::FavoritesChanged { ids });
    }

    /// Note for `id`, if any.
    #[must_use]
    pub fn note(&self, id: u32) -> Option<NoteRecord> {
        notes::load(self.backend.as_ref()).remove(&id)
    }

    /// Every stored note, ordered by id.
    #[must_use]
    pub fn notes(&self) -> Vec<NoteRecord> {
        notes::load(self.backend.as_ref()).into_values().collect()
    }

    /// Write a note; blank text deletes it. Returns the stored record.
    pub fn set_note(&self, id: u32, text: &str) -> Option<NoteRecord> {
        let mut all = notes::load(self.backend.as_ref());
        let stored = notes::apply(&mut all, id, text, Utc::now());
        if let Err(err) = notes::save(self.backend.as_ref(), &all) {
            warn!(error = %err, id, "failed to save note");
        }
        self.publish(PersonalizationEvent::NotesChanged { id: Some(id) });
        stored
    }

    /// Delete the note for `id`; returns whether one existed.
    pub fn remove_note(&self, id: u32) -> bool {
        let mut all = notes::load(self.backend.as_ref());
        if all.remove(&id).is_none() {
            return false;
        }
        if let Err(err) = notes::save(self.backend.as_ref(), &all) {
            warn!(error = %err, id, "failed to remove note");
        }
        self.publish(PersonalizationEvent::NotesChanged { id: Some(id) });
        true
    }

    /// Current theme preference.
    #[must_use]
    pub fn theme(&self) -> Theme {
        theme::load(self.backend.as_ref())
    }

    /// Store a theme preference.
    pub fn set_theme(&self, value: Theme) {
        if let Err(err) = theme::save(self.backend.as_ref(), value) {
            warn!(error = %err, theme = value.as_str(), "failed to save theme");
        }
        self.publish(PersonalizationEvent::ThemeChanged(value));
    }

    /// Advance light → dark → system → light and return the new theme.
    pub fn cycle_theme(&self) -> Theme {
        let next = self.theme().next();
        self.set_theme(next);
        next
    }

    /// Listen for writes from other contexts and resync.
    ///
    /// The task ends when the store is dropped or the backend's event
    /// channel closes.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let mut subscription = self.backend.subscribe();
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                let Some(store) = store.upgrade() else {
                    break;
                };
                debug!(key = %event.key, origin = event.origin, "external storage change");
                match event.key.as_str() {
                    favorites::FAVORITES_KEY => store.reload_favorites(),
                    notes::NOTES_KEY => store.publish(PersonalizationEvent::NotesChanged { id: None }),
                    theme::THEME_KEY => {
                        let current = store.theme();
                        store.publish(PersonalizationEvent::ThemeChanged(current));
                    }
                    _ => {}
                }
            }
        })
    }

    fn mutate_favorites(&self, change: impl FnOnce(&mut Vec<FavoriteRecord>)) {
        let mut current = self.lock_favorites();
        let mut records = favorites::load(self.backend.as_ref());
        change(&mut records);
        if let Err(err) = favorites::save(self.backend.as_ref(), &records) {
            warn!(error = %err, "failed to save favorites");
        }
        let ids = favorites::ids(&records);
        *current = records;
        drop(current);
        self.publish(PersonalizationEvent::FavoritesChanged { ids });
    }

    fn publish(&self, event: PersonalizationEvent) {
        let _ = self.events.send(event);
    }

    fn lock_favorites(&self) -> MutexGuard<'_, Vec<FavoriteRecord>> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
