#![allow(dead_code)]

use async_trait::async_trait;
use futures::{stream, StreamExt};
use rand::Rng;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use pixie::download::{DownloadExecutor, DownloadJob, HttpDownloader, PageOutcome};
use pixie::illust::{from_iter, Illust, IllustStream, IllustType};
use pixie::progress::{ProgressBarOpts, ProgressDisplay, StyleOptions};
use pixie::{Downloader, DownloaderBuilder, Error, Result};

// Common test constants
pub const TEST_UID_NAME: &str = "uid=7703097";
pub const TEST_IMAGE_URL: &str =
    "https://i.pximg.net/img-original/img/2017/05/01/00/00/00/62781001_p0.png";
pub const TEST_UGOIRA_URL: &str =
    "https://i.pximg.net/img-zip-ugoira/img/2017/05/01/00/00/00/62781002_ugoira1920x1080.zip";

/// Installs a `tracing` subscriber honoring `RUST_LOG`. Safe to call more
/// than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    std::fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

// === Illust Helpers ===

/// A single page illust.
pub fn create_test_illust(id: u64) -> Illust {
    Illust {
        title: format!("illust {}", id),
        user_id: 7703097,
        user_name: "tester".into(),
        user_account: "tester".into(),
        total_bookmarks: id * 10,
        image_urls: vec![format!(
            "https://i.pximg.net/img-original/img/2017/05/01/00/00/00/{}_p0.png",
            id
        )],
        ..Illust::new(id)
    }
}

pub fn create_test_illust_with_tags(id: u64, tags: &[&str]) -> Illust {
    Illust {
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..create_test_illust(id)
    }
}

pub fn create_test_ugoira(id: u64) -> Illust {
    Illust {
        illust_type: IllustType::Ugoira,
        frame_delays: Some(vec![60, 60, 120]),
        image_urls: vec![TEST_UGOIRA_URL.into()],
        ..create_test_illust(id)
    }
}

/// Illusts with ids `first..first + count`.
pub fn create_test_illusts(first: u64, count: u64) -> Vec<Illust> {
    (first..first + count).map(create_test_illust).collect()
}

/// A listing of `count` illusts starting at id `first`.
pub fn create_test_listing(first: u64, count: u64) -> IllustStream {
    from_iter(create_test_illusts(first, count))
}

/// A listing yielding `ok` illusts, then an error, then one more illust
/// that must never be reached.
pub fn create_failing_listing(first: u64, ok: u64) -> IllustStream {
    let mut items: Vec<Result<Illust>> = create_test_illusts(first, ok).into_iter().map(Ok).collect();
    items.push(Err(Error::Api("listing interrupted".into())));
    items.push(Ok(create_test_illust(first + ok)));
    stream::iter(items).boxed()
}

// === Executor Helpers ===

/// Succeeds for every illust and records the ids it saw.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<u64>>,
    max_jitter_ms: u64,
    fail: HashSet<u64>,
    panic: HashSet<u64>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sleeps up to `max_ms` milliseconds per call.
    pub fn with_jitter(max_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            max_jitter_ms: max_ms,
            ..Self::default()
        })
    }

    /// Fails the download of the given illusts.
    pub fn failing(ids: &[u64]) -> Arc<Self> {
        Arc::new(Self {
            fail: ids.iter().copied().collect(),
            ..Self::default()
        })
    }

    /// Panics while downloading the given illusts.
    pub fn panicking(ids: &[u64]) -> Arc<Self> {
        Arc::new(Self {
            panic: ids.iter().copied().collect(),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_of(&self, id: u64) -> usize {
        self.calls().iter().filter(|call| **call == id).count()
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=self.max_jitter_ms))
    }
}

#[async_trait]
impl DownloadExecutor for RecordingExecutor {
    async fn download(
        &self,
        job: &DownloadJob,
        _progress: &ProgressDisplay,
    ) -> Result<Vec<PageOutcome>> {
        let delay = self.jitter();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let id = job.illust.id;
        self.calls.lock().unwrap().push(id);

        if self.panic.contains(&id) {
            panic!("executor exploded on illust {}", id);
        }
        if self.fail.contains(&id) {
            return Err(Error::Download {
                illust_id: id,
                source: Box::new(Error::Interrupted {
                    expected: 1024,
                    received: 12,
                }),
            });
        }

        Ok(job
            .illust
            .image_urls
            .iter()
            .map(|url| PageOutcome {
                url: url.clone(),
                path: job.config.directory.join(format!("{}.png", id)),
                downloaded: true,
            })
            .collect())
    }
}

// === Downloader Helpers ===

/// A downloader without progress bars, running on `executor`.
pub fn create_hidden_downloader<E: DownloadExecutor + 'static>(executor: E) -> Downloader {
    DownloaderBuilder::hidden().build(executor)
}

/// Waits for every task to finish, failing the test after `secs` seconds.
pub async fn wait_all_done(downloader: &Downloader, secs: u64) {
    tokio::time::timeout(Duration::from_secs(secs), downloader.wait())
        .await
        .expect("tasks did not finish in time");
}

// === Progress Bar Helpers ===

/// Creates default test progress bar options
pub fn create_test_progress_opts() -> ProgressBarOpts {
    ProgressBarOpts::new(None, None, true, false)
}

/// Creates custom progress bar options with template and chars
pub fn create_custom_progress_opts(template: &str, chars: &str) -> ProgressBarOpts {
    ProgressBarOpts::new(Some(template.to_string()), Some(chars.to_string()), true, false)
}

/// Creates disabled style options for testing
pub fn create_disabled_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

/// Asserts that progress bar options are disabled
pub fn assert_progress_opts_disabled(opts: &ProgressBarOpts) {
    let pb = opts.to_progress_bar(100);
    assert!(pb.is_hidden(), "Progress bar should be disabled");
}

// === Local HTTP Server ===

/// Serve `body` on every request, announcing `announced` bytes.
///
/// Returns the base URL and a request counter.
pub fn serve_bytes(body: Vec<u8>, announced: usize) -> (String, Arc<AtomicUsize>) {
    serve_with(body, move |_| announced)
}

/// Like [`serve_bytes`], but the first `failures` responses are cut short.
pub fn serve_flaky(body: Vec<u8>, failures: usize) -> (String, Arc<AtomicUsize>) {
    let len = body.len();
    serve_with(body, move |hit| if hit <= failures { len * 10 } else { len })
}

fn serve_with<F>(body: Vec<u8>, announced: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(usize) -> usize + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read test server address");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let hit = counter.fetch_add(1, Ordering::SeqCst) + 1;

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                announced(hit)
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    (format!("http://{}", addr), hits)
}

/// An HTTP executor talking to the local test server directly.
pub fn create_local_http_downloader() -> HttpDownloader {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build test client");
    HttpDownloader::with_client(reqwest_middleware::ClientBuilder::new(client).build())
}
