use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tokio::net::TcpListener;

use redwood_3dscan::backend::dispatcher::{Dispatcher, DownloadSummary};
use redwood_3dscan::backend::downloader::{AssetKind, DownloadOutcome, Fetch, HttpDownloader};
use redwood_3dscan::backend::manifest::ManifestRegistry;
use redwood_3dscan::utils::{DispatchError, FetchError};

const BASE_URL: &str = "http://bucket.test/redwood-3dscan";

#[derive(Debug, Clone, PartialEq)]
struct Call {
    url: String,
    destination: PathBuf,
    skip_if_exists: bool,
}

/// Records every fetch instead of touching the network or the disk.
#[derive(Default)]
struct RecordingFetcher {
    calls: Mutex<Vec<Call>>,
    fail_extension: Option<&'static str>,
}

impl RecordingFetcher {
    fn failing(extension: &'static str) -> Self {
        Self {
            fail_extension: Some(extension),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetch for RecordingFetcher {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        skip_if_exists: bool,
    ) -> Result<DownloadOutcome, FetchError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            skip_if_exists,
        });
        match self.fail_extension {
            Some(ext) if url.ends_with(ext) => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 503,
            }),
            _ => Ok(DownloadOutcome::downloaded(10, Duration::from_millis(1))),
        }
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// 00001 has everything, 00002 only a mesh, 00003 only RGBD (and so video).
fn registry() -> ManifestRegistry {
    let mut categories = BTreeMap::new();
    categories.insert("atm".to_string(), ids(&["00001", "00002"]));
    categories.insert("chair".to_string(), ids(&["00003"]));
    ManifestRegistry::from_parts(
        ids(&["00001", "00003"]),
        ids(&["00001", "00002"]),
        categories,
    )
}

fn dispatcher(fetcher: RecordingFetcher) -> Dispatcher<RecordingFetcher> {
    Dispatcher::new(registry(), fetcher, BASE_URL, "data")
}

fn urls(calls: &[Call]) -> Vec<&str> {
    calls.iter().map(|c| c.url.as_str()).collect()
}

#[tokio::test]
async fn test_unavailable_rgbd_is_never_fetched() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    let result = dispatcher.download_rgbd("00002", true).await;

    assert!(matches!(
        result,
        Err(DispatchError::IdentifierUnavailable { kind: AssetKind::Rgbd, ref scan_id }) if scan_id == "00002"
    ));
    assert!(dispatcher.fetcher().calls().is_empty());
}

#[tokio::test]
async fn test_malformed_scan_id_is_never_fetched() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    for bad in ["1", "000001", "../00001", "abcde"] {
        assert!(matches!(
            dispatcher.download_mesh(bad, true).await,
            Err(DispatchError::InvalidScanId(_))
        ));
    }
    assert!(dispatcher.fetcher().calls().is_empty());
}

#[tokio::test]
async fn test_each_kind_uses_its_template() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    dispatcher.download_rgbd("00001", true).await.unwrap();
    dispatcher.download_mesh("00001", false).await.unwrap();
    dispatcher.download_video("00001", true).await.unwrap();

    let calls = dispatcher.fetcher().calls();
    assert_eq!(
        calls,
        vec![
            Call {
                url: format!("{BASE_URL}/rgbd/00001.zip"),
                destination: PathBuf::from("data/rgbd/00001.zip"),
                skip_if_exists: true,
            },
            Call {
                url: format!("{BASE_URL}/mesh/00001.ply"),
                destination: PathBuf::from("data/mesh/00001.ply"),
                skip_if_exists: false,
            },
            Call {
                url: format!("{BASE_URL}/video/00001.mp4"),
                destination: PathBuf::from("data/video/00001.mp4"),
                skip_if_exists: true,
            },
        ]
    );
}

#[tokio::test]
async fn test_video_follows_rgbd_availability() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    // Listed for RGBD only: the video is still offered.
    dispatcher.download_video("00003", true).await.unwrap();
    // Listed for mesh only: no video.
    assert!(matches!(
        dispatcher.download_video("00002", true).await,
        Err(DispatchError::IdentifierUnavailable { kind: AssetKind::Video, .. })
    ));

    assert_eq!(
        urls(&dispatcher.fetcher().calls()),
        [format!("{BASE_URL}/video/00003.mp4")]
    );
}

#[tokio::test]
async fn test_download_all_does_not_stop_on_failure() {
    let dispatcher = dispatcher(RecordingFetcher::failing(".ply"));

    let reports = dispatcher.download_all("00001", true).await;

    let kinds: Vec<_> = reports.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, AssetKind::ALL);
    assert!(reports[0].result.is_ok());
    assert!(matches!(
        reports[1].result,
        Err(DispatchError::Fetch(FetchError::HttpStatus { status: 503, .. }))
    ));
    assert!(reports[2].result.is_ok());
    assert_eq!(dispatcher.fetcher().calls().len(), 3);
}

#[tokio::test]
async fn test_category_fetches_each_available_asset() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    let reports = dispatcher.download_category("atm", true).await.unwrap();

    // 2 ids x 3 kinds considered, only the listed ones fetched.
    assert_eq!(reports.len(), 6);
    assert_eq!(
        urls(&dispatcher.fetcher().calls()),
        [
            format!("{BASE_URL}/rgbd/00001.zip"),
            format!("{BASE_URL}/mesh/00001.ply"),
            format!("{BASE_URL}/video/00001.mp4"),
            format!("{BASE_URL}/mesh/00002.ply"),
        ]
    );

    let summary = DownloadSummary::from_reports(&reports);
    assert_eq!(summary.downloaded, 4);
    assert_eq!(summary.unavailable, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_unknown_category_fetches_nothing() {
    let dispatcher = dispatcher(RecordingFetcher::default());

    let result = dispatcher.download_category("nonexistent", true).await;

    assert!(matches!(result, Err(DispatchError::CategoryNotFound(ref name)) if name == "nonexistent"));
    assert!(dispatcher.fetcher().calls().is_empty());
}

async fn serve_asset(State(hits): State<Arc<AtomicUsize>>) -> Vec<u8> {
    hits.fetch_add(1, Ordering::SeqCst);
    vec![7u8; 4096]
}

async fn start_bucket() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/redwood-3dscan/{kind}/{file}", get(serve_asset))
        .with_state(hits.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

#[tokio::test]
async fn test_category_materializes_data_tree() {
    let (addr, hits) = start_bucket().await;
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    let downloader =
        HttpDownloader::with_timeouts("redwood-3dscan-test", Duration::from_secs(5), None).unwrap();
    let dispatcher = Dispatcher::new(
        registry(),
        downloader,
        format!("http://{addr}/redwood-3dscan"),
        &data_dir,
    );

    let first = dispatcher.download_category("atm", true).await.unwrap();
    assert_eq!(DownloadSummary::from_reports(&first).downloaded, 4);
    assert_eq!(hits.load(Ordering::SeqCst), 4);

    for path in [
        "rgbd/00001.zip",
        "mesh/00001.ply",
        "video/00001.mp4",
        "mesh/00002.ply",
    ] {
        assert_eq!(std::fs::metadata(data_dir.join(path)).unwrap().len(), 4096);
    }
    assert!(!data_dir.join("rgbd/00002.zip").exists());
    assert!(!data_dir.join("video/00002.mp4").exists());

    // Everything is on disk now, so a second run transfers nothing.
    let second = dispatcher.download_category("atm", true).await.unwrap();
    assert_eq!(DownloadSummary::from_reports(&second).skipped, 4);
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_unavailable_id_touches_no_files() {
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    // Nothing listens here; any request would fail loudly.
    let downloader =
        HttpDownloader::with_timeouts("redwood-3dscan-test", Duration::from_secs(1), None).unwrap();
    let dispatcher = Dispatcher::new(registry(), downloader, "http://127.0.0.1:9", &data_dir);

    let result = dispatcher.download_rgbd("00002", true).await;

    assert!(matches!(result, Err(DispatchError::IdentifierUnavailable { .. })));
    assert!(!data_dir.exists());
}
