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

//! View state for dexview: the URL codec, list shaping, and the pipeline
//! that keeps one consistent snapshot across browse, search, and favorites.

pub mod pipeline;
pub mod snapshot;
pub mod transform;
pub mod url;

pub use pipeline::{PipelineSettings, ViewPipeline};
pub use snapshot::{ViewMode, ViewSnapshot};
pub use transform::{derive_view, sort_records};
pub use crate::url::{parse, serialize};
