//! Backend of the application.

pub mod cli;
pub mod dispatcher;
pub mod downloader;
pub mod manifest;
pub mod utils;

pub use dispatcher::Dispatcher;
pub use downloader::HttpDownloader;
pub use manifest::ManifestRegistry;
