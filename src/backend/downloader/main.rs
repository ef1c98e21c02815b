//! HTTP downloader: streams one remote object to one local file.

use futures_util::StreamExt;
use log::{error, info};
use reqwest::Client;
use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::models::DownloadOutcome;
use crate::backend::utils::config::AppConfig;
use crate::backend::utils::system::files::{ensure_parent_directory, is_regular_file};
use crate::utils::FetchError;

/// Size of the write buffer between the response body and the file.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Something that can materialize a remote object at a local path.
pub trait Fetch {
    /// Downloads `url` to `destination`.
    ///
    /// With `skip_if_exists`, an existing regular file at `destination` counts
    /// as done regardless of its content.
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        skip_if_exists: bool,
    ) -> impl Future<Output = Result<DownloadOutcome, FetchError>> + Send;
}

/// reqwest-backed [`Fetch`].
#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(config: &AppConfig) -> reqwest::Result<Self> {
        Self::with_timeouts(&config.user_agent, config.connect_timeout(), config.timeout())
    }

    pub fn with_timeouts(
        user_agent: &str,
        connect_timeout: Duration,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        ensure_parent_directory(destination)
            .await
            .map_err(|e| FetchError::io(destination.parent().unwrap_or(destination), e))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        // Status is known before any body byte, so a failed request leaves no file.
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let file = File::create(destination)
            .await
            .map_err(|e| FetchError::io(destination, e))?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut num_bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::transport(url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(destination, e))?;
            num_bytes += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| FetchError::io(destination, e))?;

        Ok(num_bytes)
    }
}

impl Fetch for HttpDownloader {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, FetchError> {
        info!("Downloading {} to {}.", url, destination.display());

        if skip_if_exists && is_regular_file(destination).await {
            info!("{} already exists. Skipped.", destination.display());
            return Ok(DownloadOutcome::skipped());
        }

        let start = Instant::now();
        match self.download(url, destination).await {
            Ok(num_bytes) => {
                let outcome = DownloadOutcome::downloaded(num_bytes, start.elapsed());
                info!(
                    "Downloaded {:.2}MB, speed {:.2}MB/s.",
                    outcome.megabytes(),
                    outcome.throughput()
                );
                Ok(outcome)
            }
            Err(e) => {
                error!("{e}");
                Err(e)
            }
        }
    }
}
