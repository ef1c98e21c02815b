//! Fetch engine.
//!
//! Streams remote dataset objects to local files, skipping files that are
//! already present.

/// HTTP downloader implementation.
pub mod main;
/// Asset kinds, descriptors and download outcomes.
pub mod models;

pub use main::{CHUNK_SIZE, Fetch, HttpDownloader};
pub use models::{AssetDescriptor, AssetKind, DownloadOutcome};
