#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unused, unreachable_pub)]

//! Client-local personalization storage.
//!
//! Favorites, notes, and the theme preference live in a string key-value
//! store. Reads never fail (corrupt or missing values become defaults) and
//! writes are best-effort.

pub mod backend;
pub mod error;
pub mod events;
pub mod favorites;
pub mod notes;
pub mod personalization;
pub mod theme;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::{StoreError, StoreResult};
pub use events::{PersonalizationEvent, StorageEvent, StorageSubscription};
pub use favorites::FAVORITES_KEY;
pub use notes::NOTES_KEY;
pub use personalization::PersonalizationStore;
pub use theme::THEME_KEY;
