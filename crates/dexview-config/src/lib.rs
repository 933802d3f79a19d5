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

//! Runtime configuration for dexview clients.
//!
//! Layout: `defaults.rs` (constants carried over from the catalog's reference
//! behaviour), `model.rs` (typed configuration), `loader.rs` (environment
//! overrides and validation), `error.rs` (error taxonomy).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, load_from_env, load_from_lookup};
pub use model::CatalogConfig;
