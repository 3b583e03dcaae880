//! The seam between the task queue and the code performing transfers.

use super::config::DownloadConfig;
use crate::error::Result;
use crate::illust::Illust;
use crate::progress::ProgressDisplay;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a download task needs to store one illust.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub illust: Arc<Illust>,
    /// 1-based position of the illust in its listing.
    pub order: usize,
    pub config: Arc<DownloadConfig>,
}

/// Result of storing a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub url: String,
    pub path: PathBuf,
    /// `false` when the page was skipped (file already present, fake download).
    pub downloaded: bool,
}

/// Performs the transfer of one illust.
///
/// Implementations are shared by every worker and called once per download
/// task. Any error returned marks the task as failed; the queue never retries
/// on its own. Calls are not cancelled or timed out by the queue.
#[async_trait]
pub trait DownloadExecutor: Send + Sync {
    async fn download(
        &self,
        job: &DownloadJob,
        progress: &ProgressDisplay,
    ) -> Result<Vec<PageOutcome>>;
}

#[async_trait]
impl<T: DownloadExecutor + ?Sized> DownloadExecutor for Arc<T> {
    async fn download(
        &self,
        job: &DownloadJob,
        progress: &ProgressDisplay,
    ) -> Result<Vec<PageOutcome>> {
        (**self).download(job, progress).await
    }
}

/// Converts an ugoira frame archive into an animated image.
///
/// Format conversion is not part of this crate; plug an implementation into
/// [`HttpDownloader::with_converter`](super::HttpDownloader::with_converter).
/// It runs on the blocking thread pool.
pub trait FrameConverter: Send + Sync {
    fn convert(&self, archive: &[u8], frame_delays: &[u32], output: &Path) -> Result<()>;
}
