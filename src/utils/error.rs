//! Error handling.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::downloader::models::AssetKind;

/// Failure of a single fetch. Nothing past the fetch boundary panics or
/// bubbles up in another form; every problem ends up in one of these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Download request for {url} failed with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Download request for {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn transport(url: &str, err: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why the dispatcher did not produce a downloaded asset.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Category {0} not found")]
    CategoryNotFound(String),

    #[error("{kind} scan_id {scan_id} is not available")]
    IdentifierUnavailable { kind: AssetKind, scan_id: String },

    #[error("{0:?} is not a 5-digit scan_id")]
    InvalidScanId(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl DispatchError {
    /// Only fetch failures count against the exit status. The rest are
    /// reported and skipped.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
