//! Resolves scan ids and categories to assets and hands them to a [`Fetch`].

use log::{info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::backend::downloader::{AssetDescriptor, AssetKind, DownloadOutcome, Fetch};
use crate::backend::manifest::ManifestRegistry;
use crate::utils::DispatchError;

static SCAN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("scan id pattern is valid"));

pub fn is_valid_scan_id(scan_id: &str) -> bool {
    SCAN_ID.is_match(scan_id)
}

/// What happened to one `(scan_id, kind)` pair.
#[derive(Debug)]
pub struct AssetReport {
    pub scan_id: String,
    pub kind: AssetKind,
    pub result: Result<DownloadOutcome, DispatchError>,
}

/// Totals over a batch of [`AssetReport`]s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub bytes_written: u64,
}

impl DownloadSummary {
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a AssetReport>) -> Self {
        reports
            .into_iter()
            .fold(Self::default(), |mut summary, report| {
                match &report.result {
                    Ok(outcome) if outcome.skipped => summary.skipped += 1,
                    Ok(outcome) => {
                        summary.downloaded += 1;
                        summary.bytes_written += outcome.bytes_written;
                    }
                    Err(e) if e.is_failure() => summary.failed += 1,
                    Err(_) => summary.unavailable += 1,
                }
                summary
            })
    }

    /// Unavailable ids and unknown categories do not count against this.
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Maps scan ids and category names onto fetches, consulting the manifests
/// first so nothing unlisted ever reaches the network.
pub struct Dispatcher<F> {
    registry: ManifestRegistry,
    fetcher: F,
    base_url: String,
    data_dir: PathBuf,
}

impl<F: Fetch> Dispatcher<F> {
    pub fn new(
        registry: ManifestRegistry,
        fetcher: F,
        base_url: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            base_url: base_url.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn registry(&self) -> &ManifestRegistry {
        &self.registry
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn descriptor(&self, scan_id: &str, kind: AssetKind) -> AssetDescriptor {
        AssetDescriptor::new(scan_id, kind, &self.base_url, &self.data_dir)
    }

    fn is_available(&self, scan_id: &str, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Rgbd => self.registry.is_rgbd_available(scan_id),
            AssetKind::Mesh => self.registry.is_mesh_available(scan_id),
            AssetKind::Video => self.registry.is_video_available(scan_id),
        }
    }

    /// Downloads one asset if the manifests list it.
    pub async fn download(
        &self,
        scan_id: &str,
        kind: AssetKind,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, DispatchError> {
        if !is_valid_scan_id(scan_id) {
            warn!("{scan_id:?} is not a 5-digit scan_id. Skipped.");
            return Err(DispatchError::InvalidScanId(scan_id.to_string()));
        }
        if !self.is_available(scan_id, kind) {
            info!("{kind} scan_id {scan_id} is not available. Skipped.");
            return Err(DispatchError::IdentifierUnavailable {
                kind,
                scan_id: scan_id.to_string(),
            });
        }

        let asset = self.descriptor(scan_id, kind);
        Ok(self
            .fetcher
            .fetch(&asset.url, &asset.destination, skip_if_exists)
            .await?)
    }

    pub async fn download_rgbd(
        &self,
        scan_id: &str,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, DispatchError> {
        self.download(scan_id, AssetKind::Rgbd, skip_if_exists).await
    }

    pub async fn download_mesh(
        &self,
        scan_id: &str,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, DispatchError> {
        self.download(scan_id, AssetKind::Mesh, skip_if_exists).await
    }

    pub async fn download_video(
        &self,
        scan_id: &str,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, DispatchError> {
        self.download(scan_id, AssetKind::Video, skip_if_exists).await
    }

    /// RGBD, mesh and video for one scan, in that order. A failure on one
    /// kind does not stop the others.
    pub async fn download_all(&self, scan_id: &str, skip_if_exists: bool) -> Vec<AssetReport> {
        let mut reports = Vec::with_capacity(AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            reports.push(AssetReport {
                scan_id: scan_id.to_string(),
                kind,
                result: self.download(scan_id, kind, skip_if_exists).await,
            });
        }
        reports
    }

    /// [`Self::download_all`] for every scan in the category, in manifest order.
    pub async fn download_category(
        &self,
        category_name: &str,
        skip_if_exists: bool,
    ) -> Result<Vec<AssetReport>, DispatchError> {
        info!("Downloading category {category_name}.");

        let scan_ids = match self.registry.resolve_category(category_name) {
            Ok(scan_ids) => scan_ids,
            Err(e) => {
                info!("{e}. Skipped.");
                return Err(e);
            }
        };

        let mut reports = Vec::with_capacity(scan_ids.len() * AssetKind::ALL.len());
        for scan_id in scan_ids {
            reports.extend(self.download_all(scan_id, skip_if_exists).await);
        }
        Ok(reports)
    }
}
