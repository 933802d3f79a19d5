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
#![allow(clippy::redundant_pub_crate)]

//! Request orchestration for the remote catalog.
//!
//! Layout:
//! - `error.rs`: failure taxonomy shared by every call
//! - `timer.rs`: timer seam used by the batch window
//! - `batcher.rs`: time-windowed coalescing of by-id requests
//! - `cancel.rs`: per-key supersession of in-flight requests
//! - `client.rs`: typed list/detail/search calls over HTTP
//! - `source.rs`: the trait the view pipeline consumes

pub mod batcher;
pub mod cancel;
pub mod client;
pub mod error;
pub mod source;
pub mod timer;

pub use batcher::{BatchSettings, BulkFetch, RequestBatcher, fetch_in_chunks};
pub use cancel::{CancellationRegistry, RequestTicket};
pub use client::{LIST_CANCEL_KEY, ListWindow, ResourceClient, SEARCH_CANCEL_KEY, list_window};
pub use error::{ClientError, ClientResult};
pub use source::CatalogSource;
pub use timer::{Timer, TokioTimer};
