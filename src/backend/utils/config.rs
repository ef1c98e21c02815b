use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://s3.us-west-1.wasabisys.com/redwood-3dscan";

/// Runtime settings. Every field has a default, so a config file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Bucket root; asset URLs are `{base_url}/{kind}/{scan_id}.{ext}`.
    pub base_url: String,
    /// Local root of the `rgbd/`, `mesh/` and `video/` trees.
    pub data_dir: PathBuf,
    /// Directory holding `rgbds.json`, `meshes.json` and `categories.json`.
    pub manifest_dir: PathBuf,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout. Unset means no limit.
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            manifest_dir: PathBuf::from("."),
            user_agent: format!("redwood-3dscan/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
