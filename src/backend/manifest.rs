//! Manifest registry.
//!
//! Three static documents describe what the bucket holds: the scan ids with
//! an RGBD bundle, the scan ids with a reconstructed mesh, and a grouping of
//! scan ids by category. They are read once and never change afterwards.

use anyhow::Context;
use log::info;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::utils::DispatchError;

pub const RGBD_MANIFEST: &str = "rgbds.json";
pub const MESH_MANIFEST: &str = "meshes.json";
pub const CATEGORY_MANIFEST: &str = "categories.json";

#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
    rgbd_ids: HashSet<String>,
    mesh_ids: HashSet<String>,
    categories: BTreeMap<String, Vec<String>>,
}

impl ManifestRegistry {
    pub fn from_parts<R, M>(rgbd_ids: R, mesh_ids: M, categories: BTreeMap<String, Vec<String>>) -> Self
    where
        R: IntoIterator<Item = String>,
        M: IntoIterator<Item = String>,
    {
        Self {
            rgbd_ids: rgbd_ids.into_iter().collect(),
            mesh_ids: mesh_ids.into_iter().collect(),
            categories,
        }
    }

    /// Reads the three manifests from `dir`.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let rgbd_ids: Vec<String> = read_manifest(&dir.join(RGBD_MANIFEST))?;
        let mesh_ids: Vec<String> = read_manifest(&dir.join(MESH_MANIFEST))?;
        let categories: BTreeMap<String, Vec<String>> =
            read_manifest(&dir.join(CATEGORY_MANIFEST))?;

        let registry = Self::from_parts(rgbd_ids, mesh_ids, categories);
        info!(
            "Loaded manifests from {}: {} RGBD scans, {} meshes, {} categories",
            dir.display(),
            registry.rgbd_count(),
            registry.mesh_count(),
            registry.category_count()
        );
        Ok(registry)
    }

    pub fn is_rgbd_available(&self, scan_id: &str) -> bool {
        self.rgbd_ids.contains(scan_id)
    }

    pub fn is_mesh_available(&self, scan_id: &str) -> bool {
        self.mesh_ids.contains(scan_id)
    }

    /// Videos have no manifest of their own: every scan with an RGBD bundle
    /// also has a video, so this intentionally answers from the RGBD set.
    pub fn is_video_available(&self, scan_id: &str) -> bool {
        self.is_rgbd_available(scan_id)
    }

    pub fn resolve_category(&self, name: &str) -> Result<&[String], DispatchError> {
        self.categories
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DispatchError::CategoryNotFound(name.to_string()))
    }

    /// Categories sorted by name.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn rgbd_count(&self) -> usize {
        self.rgbd_ids.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_ids.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

fn read_manifest<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))
}
