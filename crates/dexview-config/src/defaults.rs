//! Default values for catalog access, batching, and paging.
//!
//! # Design
//! - Centralize defaults so the client, pipeline, and CLI agree.
//! - Keep time-based defaults explicit for auditability.

/// Remote catalog base URL.
pub const API_BASE_URL: &str = "https://pokeapi.co/api/v2";
/// Upper bound for any single outbound call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Calls slower than this are logged as slow, in milliseconds.
pub const SLOW_CALL_THRESHOLD_MS: u64 = 3_000;
/// Entries per list page.
pub const PAGE_SIZE: u32 = 20;
/// Maximum ids per batch dispatch.
pub const BATCH_SIZE: usize = 20;
/// Batch window measured from the first queued request, in milliseconds.
pub const BATCH_DELAY_MS: u64 = 100;
/// Ids fetched concurrently inside one batch dispatch.
pub const CHUNK_SIZE: usize = 5;
/// Quiet period after the last keystroke before a search starts, in milliseconds.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
/// Maximum number of search matches resolved to full records.
pub const SEARCH_LIMIT: usize = 20;
/// Listing size requested when building the search index.
pub const SEARCH_LISTING_LIMIT: u32 = 1_500;
/// Highest catalog id kept in browse mode.
pub const MAX_ID: u32 = 1_025;
/// Resolved/loaded ratio above which the next page is prefetched.
pub const PREFETCH_RATIO: f64 = 0.8;
/// Directory name used for the local state store.
pub const STATE_DIR_NAME: &str = "dexview";
