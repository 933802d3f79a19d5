#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unused, unreachable_pub)]
#![allow(clippy::multiple_crate_versions)]
//! Shared models for the dexview catalog.
//!
//! These types are re-used by the client, the view pipeline, the local store,
//! and the CLI so the wire shapes of the remote catalog and of the local key
//! space stay a single source of truth.
//!
//! Layout: `records.rs` (remote payloads), `state.rs` (URL-driven page state),
//! `cohort.rs` (generation ranges and category tags), `personal.rs`
//! (favorites, notes, theme).

pub mod cohort;
pub mod personal;
pub mod records;
pub mod state;

pub use cohort::{CATEGORIES, COHORTS, Cohort, MAX_CATALOG_ID, find_cohort};
pub use personal::{FavoriteDraft, FavoriteRecord, NoteRecord, Theme};
pub use records::{
    Ability, DetailRecord, ListItem, NamedResource, PaginatedResponse, Sprites, Stat, TypeSlot,
    extract_id_from_url,
};
pub use state::{Filters, PageState, SortField, SortOrder, SortSpec};
