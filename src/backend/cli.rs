//! Command-line front end over the dispatcher.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::backend::dispatcher::{AssetReport, Dispatcher, DownloadSummary};
use crate::backend::downloader::{AssetKind, Fetch, HttpDownloader};
use crate::backend::manifest::ManifestRegistry;
use crate::backend::utils::config::AppConfig;
use crate::backend::utils::formater::format_bytes;

#[derive(Parser, Debug)]
#[command(name = "redwood-3dscan", version, about = "Download scans from the Redwood 3D scan dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing rgbds.json, meshes.json and categories.json
    #[arg(short, long, global = true)]
    pub manifest_dir: Option<PathBuf>,

    /// Root of the local data tree
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Bucket URL to download from
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Download again even if the file is already present
    #[arg(short, long, global = true)]
    pub force: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download RGBD image bundles
    Rgbd {
        #[arg(required = true)]
        scan_ids: Vec<String>,
    },
    /// Download reconstructed meshes
    Mesh {
        #[arg(required = true)]
        scan_ids: Vec<String>,
    },
    /// Download RGB videos
    Video {
        #[arg(required = true)]
        scan_ids: Vec<String>,
    },
    /// Download RGBD, mesh and video for each scan
    All {
        #[arg(required = true)]
        scan_ids: Vec<String>,
    },
    /// Download everything in the given categories
    Category {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List categories and their scan counts
    Categories,
}

impl Cli {
    /// Config file (if any) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(dir) = &self.manifest_dir {
            config.manifest_dir = dir.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        Ok(config)
    }

    /// `--force` turns the existing-file shortcut off.
    pub const fn skip_if_exists(&self) -> bool {
        !self.force
    }
}

/// Runs the parsed command. Returns `true` when every attempted fetch succeeded.
pub async fn run(cli: Cli) -> Result<bool> {
    let config = cli.resolve_config()?;
    let registry = ManifestRegistry::load(&config.manifest_dir)?;
    let downloader = HttpDownloader::new(&config).context("Failed to create HTTP client")?;
    let dispatcher = Dispatcher::new(registry, downloader, &config.base_url, &config.data_dir);

    let reports = execute(&dispatcher, &cli.command, cli.skip_if_exists()).await;
    if let Commands::Categories = cli.command {
        return Ok(true);
    }

    let summary = DownloadSummary::from_reports(&reports);
    info!(
        "Done: {} downloaded ({}), {} skipped, {} unavailable, {} failed.",
        summary.downloaded,
        format_bytes(summary.bytes_written),
        summary.skipped,
        summary.unavailable,
        summary.failed
    );
    if !summary.is_success() {
        warn!("{} download(s) failed", summary.failed);
    }

    Ok(summary.is_success())
}

/// Dispatches one command sequentially, collecting a report per asset.
pub async fn execute<F: Fetch>(
    dispatcher: &Dispatcher<F>,
    command: &Commands,
    skip_if_exists: bool,
) -> Vec<AssetReport> {
    match command {
        Commands::Rgbd { scan_ids } => {
            download_each(dispatcher, AssetKind::Rgbd, scan_ids, skip_if_exists).await
        }
        Commands::Mesh { scan_ids } => {
            download_each(dispatcher, AssetKind::Mesh, scan_ids, skip_if_exists).await
        }
        Commands::Video { scan_ids } => {
            download_each(dispatcher, AssetKind::Video, scan_ids, skip_if_exists).await
        }
        Commands::All { scan_ids } => {
            let mut reports = Vec::new();
            for scan_id in scan_ids {
                reports.extend(dispatcher.download_all(scan_id, skip_if_exists).await);
            }
            reports
        }
        Commands::Category { names } => {
            let mut reports = Vec::new();
            for name in names {
                // Unknown categories are already logged by the dispatcher.
                if let Ok(category) = dispatcher.download_category(name, skip_if_exists).await {
                    reports.extend(category);
                }
            }
            reports
        }
        Commands::Categories => {
            list_categories(dispatcher.registry());
            Vec::new()
        }
    }
}

async fn download_each<F: Fetch>(
    dispatcher: &Dispatcher<F>,
    kind: AssetKind,
    scan_ids: &[String],
    skip_if_exists: bool,
) -> Vec<AssetReport> {
    let mut reports = Vec::with_capacity(scan_ids.len());
    for scan_id in scan_ids {
        reports.push(AssetReport {
            scan_id: scan_id.clone(),
            kind,
            result: dispatcher.download(scan_id, kind, skip_if_exists).await,
        });
    }
    reports
}

fn list_categories(registry: &ManifestRegistry) {
    for (name, scan_ids) in registry.categories() {
        println!("{name:<24} {:>5} scans", scan_ids.len());
    }
}
