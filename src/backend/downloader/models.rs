use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

/// The three files published for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Rgbd,
    Mesh,
    Video,
}

impl AssetKind {
    pub const ALL: [Self; 3] = [Self::Rgbd, Self::Mesh, Self::Video];

    /// Directory name, shared by the bucket and the local tree.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Rgbd => "rgbd",
            Self::Mesh => "mesh",
            Self::Video => "video",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Rgbd => "zip",
            Self::Mesh => "ply",
            Self::Video => "mp4",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgbd => "RGBD",
            Self::Mesh => "Mesh",
            Self::Video => "Video",
        })
    }
}

/// Where one asset lives remotely and where it lands locally.
///
/// Both locations are pure functions of `(scan_id, kind)`, so the same pair
/// always maps to the same destination. Skip-if-exists relies on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub scan_id: String,
    pub kind: AssetKind,
    pub url: String,
    pub destination: PathBuf,
}

impl AssetDescriptor {
    pub fn new(scan_id: &str, kind: AssetKind, base_url: &str, data_dir: &Path) -> Self {
        let file_name = format!("{scan_id}.{}", kind.extension());
        Self {
            scan_id: scan_id.to_string(),
            kind,
            url: format!(
                "{}/{}/{file_name}",
                base_url.trim_end_matches('/'),
                kind.dir_name()
            ),
            destination: data_dir.join(kind.dir_name()).join(file_name),
        }
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadOutcome {
    pub bytes_written: u64,
    pub elapsed: Duration,
    /// The destination already existed and was left untouched.
    pub skipped: bool,
}

impl DownloadOutcome {
    pub const fn skipped() -> Self {
        Self {
            bytes_written: 0,
            elapsed: Duration::ZERO,
            skipped: true,
        }
    }

    pub const fn downloaded(bytes_written: u64, elapsed: Duration) -> Self {
        Self {
            bytes_written,
            elapsed,
            skipped: false,
        }
    }

    pub fn megabytes(&self) -> f64 {
        self.bytes_written as f64 / BYTES_PER_MEGABYTE
    }

    /// MB/s, or 0 when no measurable time passed.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.megabytes() / secs
        } else {
            0.0
        }
    }
}
