//! Download executor backed by HTTP.
//!
//! [`HttpDownloader`] stores every page of an illust on disk. Pages that are
//! already present are skipped unless `replace` is set, failed attempts are
//! retried up to `max_tries` times (forever when unset) with their partial
//! files removed, and
//! ugoira archives are either handed to a [`FrameConverter`] or stored next
//! to a frame-delay sidecar file.
//!
//! ```rust,no_run
//! use pixie::download::HttpDownloader;
//! use pixie::http::HttpClientConfig;
//!
//! # fn example() -> pixie::Result<()> {
//! let executor = HttpDownloader::new(HttpClientConfig::default())?;
//! # Ok(())
//! # }
//! ```

use super::executor::{DownloadExecutor, DownloadJob, FrameConverter, PageOutcome};
use super::naming::page_path;
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::ProgressDisplay;
use crate::utils::{expected_length, is_truncated};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

/// Upper bound on the buffer reserved from an announced body length.
const MAX_PREALLOC: u64 = 8 << 20;

/// Stores illust pages on disk through HTTP.
#[derive(Clone)]
pub struct HttpDownloader {
    client: ClientWithMiddleware,
    converter: Option<Arc<dyn FrameConverter>>,
}

impl fmt::Debug for HttpDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDownloader")
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

impl HttpDownloader {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::with_client(create_http_client(config)?))
    }

    /// Use an already configured client.
    pub fn with_client(client: ClientWithMiddleware) -> Self {
        Self {
            client,
            converter: None,
        }
    }

    /// Converter used for ugoira when `convert_ugoira` is set.
    pub fn with_converter(mut self, converter: Arc<dyn FrameConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Fetches `url` fully into memory.
    async fn fetch(&self, url: &str, progress: &ProgressDisplay) -> Result<Vec<u8>> {
        debug!("Fetching {}", url);
        let res = self.client.get(url).send().await?.error_for_status()?;

        let expected = expected_length(&res);
        let pb = progress.create_child_progress(expected.unwrap_or(0), 0);
        if let Some(name) = url.rsplit('/').next() {
            pb.set_message(name.to_string());
        }

        let mut buffer = Vec::with_capacity(expected.map_or(0, |n| n.min(MAX_PREALLOC)) as usize);
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            pb.inc(chunk.len() as u64);
            buffer.extend_from_slice(&chunk);
        }
        progress.finish_child(pb);

        let received = buffer.len() as u64;
        if is_truncated(expected, received) {
            return Err(Error::Interrupted {
                expected: expected.unwrap_or(0),
                received,
            });
        }

        Ok(buffer)
    }

    /// One attempt at storing a page. Returns the files written.
    async fn store_page(
        &self,
        job: &DownloadJob,
        url: &str,
        path: &Path,
        progress: &ProgressDisplay,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let data = self.fetch(url, progress).await?;
        let illust = &job.illust;

        if illust.is_ugoira() && job.config.convert_ugoira {
            let converter = self
                .converter
                .clone()
                .ok_or_else(|| Error::Conversion("no frame converter configured".into()))?;
            let delays = illust.frame_delays.clone().unwrap_or_default();
            let output = path.to_path_buf();
            written.push(output.clone());
            return tokio::task::spawn_blocking(move || converter.convert(&data, &delays, &output))
                .await
                .map_err(|e| Error::Internal(format!("frame conversion task failed: {}", e)))?;
        }

        written.push(path.to_path_buf());
        let mut file = fs::File::create(path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        if illust.is_ugoira() {
            let sidecar = path.with_extension("txt");
            written.push(sidecar.clone());
            let delays = illust
                .frame_delays
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|delay| format!("{}\n", delay))
                .collect::<String>();
            fs::write(&sidecar, delays).await?;
        }

        Ok(())
    }

    /// Stores one page, retrying up to `max_tries` times, or until it
    /// succeeds when `max_tries` is `None`.
    ///
    /// Returns `false` when the page was skipped.
    async fn download_page(
        &self,
        job: &DownloadJob,
        url: &str,
        path: &Path,
        progress: &ProgressDisplay,
    ) -> Result<bool> {
        let config = &job.config;

        if !config.replace && fs::try_exists(path).await? {
            debug!(path = %path.display(), "Page already exists, skipping");
            return Ok(false);
        }
        if exists_in(path, &config.check_exists).await? {
            debug!(path = %path.display(), "Page found in a checked directory, skipping");
            return Ok(false);
        }
        if config.fake_download {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut tries = 1;
        loop {
            let mut written = Vec::new();
            match self.store_page(job, url, path, progress, &mut written).await {
                Ok(()) => return Ok(true),
                Err(e) => {
                    for file in &written {
                        let _ = fs::remove_file(file).await;
                    }
                    if config.max_tries.is_some_and(|max| tries >= max) {
                        return Err(Error::Download {
                            illust_id: job.illust.id,
                            source: Box::new(e),
                        });
                    }
                    warn!(
                        illust_id = job.illust.id,
                        tries,
                        "Page download failed, retrying: {}",
                        e
                    );
                    tries += 1;
                }
            }
        }
    }
}

/// `true` if a file named like `path` exists in one of `directories`.
async fn exists_in(path: &Path, directories: &[PathBuf]) -> Result<bool> {
    let Some(name) = path.file_name() else {
        return Ok(false);
    };
    for dir in directories {
        if fs::try_exists(dir.join(name)).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[async_trait]
impl DownloadExecutor for HttpDownloader {
    async fn download(
        &self,
        job: &DownloadJob,
        progress: &ProgressDisplay,
    ) -> Result<Vec<PageOutcome>> {
        let mut outcomes = Vec::with_capacity(job.illust.page_count());

        for (page, url) in job.illust.image_urls.iter().enumerate() {
            let path = page_path(&job.config, &job.illust, job.order, page, url)?;
            let downloaded = self.download_page(job, url, &path, progress).await?;
            outcomes.push(PageOutcome {
                url: url.clone(),
                path,
                downloaded,
            });
        }

        Ok(outcomes)
    }
}
