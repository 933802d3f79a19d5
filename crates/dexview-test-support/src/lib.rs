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

//! Shared test helpers used across dexview suites.
//! Layout: fixtures.rs (records and JSON payloads), mocks.rs (in-memory catalog).

pub mod fixtures;
pub mod mocks;
