//! Configuration structures and defaults for the downloader.
//!
//! [`DownloaderConfig`] is filled by the [`DownloaderBuilder`] and fixed for
//! the lifetime of a [`Downloader`]. [`FetchOptions`] travels with each
//! fetch task.
//!
//! # Examples
//!
//! ## Using Callbacks
//!
//! ```rust
//! use pixie::downloader::TaskCallback;
//! use pixie::task::{Status, TaskSnapshot};
//!
//! let callback: TaskCallback = Box::new(|task: &TaskSnapshot| match task.status() {
//!     Status::Success => println!("✓ {}", task.name()),
//!     Status::Failure => println!("✗ {}: {:?}", task.name(), task.exception()),
//!     _ => {}
//! });
//! ```
//!
//! ## Fetch Options
//!
//! ```rust
//! use pixie::downloader::FetchOptions;
//! use pixie::download::DownloadConfig;
//! use pixie::illust::{Query, Q};
//!
//! let options = FetchOptions::new()
//!     .name("uid=7703097")
//!     .query(Query::new().filter(Q::min_bookmarks(1000)).limit_after(50))
//!     .download(DownloadConfig::new("downloads").name("{id}_p{page}{ext}"));
//! ```
//!
//! [`DownloaderBuilder`]: super::DownloaderBuilder
//! [`Downloader`]: super::Downloader

use crate::download::DownloadConfig;
use crate::illust::Query;
use crate::progress::StyleOptions;
use crate::task::TaskSnapshot;

use std::sync::Arc;

/// Callback invoked whenever a task reaches a terminal status.
pub type TaskCallback = Box<dyn Fn(&TaskSnapshot) + Send + Sync>;

/// What the workers do after a task fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Store the error on the task and keep going.
    #[default]
    Isolate,
    /// Store the error, then halt every worker. Remaining tasks stay pending.
    HaltOnError,
}

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Number of workers started by [`Downloader::start`](super::Downloader::start).
    pub workers: usize,
    /// Behavior after a task failure.
    pub failure_policy: FailurePolicy,
    /// Downloader style options.
    pub style_options: StyleOptions,
    /// Callback for when each task completes.
    pub on_complete: Option<Arc<TaskCallback>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("workers", &self.workers)
            .field("failure_policy", &self.failure_policy)
            .field("style_options", &self.style_options)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            failure_policy: FailurePolicy::default(),
            style_options: StyleOptions::default(),
            on_complete: None,
        }
    }
}

/// Options of one fetch task.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Task name, `Task {n}` when unset.
    pub name: Option<String>,
    /// Shapes the listing before download tasks are created.
    pub query: Query,
    /// Shared by every download task of the listing.
    pub download: DownloadConfig,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }
}
