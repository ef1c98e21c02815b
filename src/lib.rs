//! Downloader for the Redwood "A Large Dataset of Object Scans" dataset.
//!
//! [`backend::manifest::ManifestRegistry`] knows which scans exist,
//! [`backend::downloader::HttpDownloader`] moves bytes, and
//! [`backend::dispatcher::Dispatcher`] ties the two together behind the
//! `download_*` operations.

pub mod backend;
pub mod utils;
