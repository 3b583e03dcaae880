//! Core downloader implementation.
//!
//! This module contains the main [`Downloader`] struct that owns the task
//! queue and the worker pool, and reports task status to the caller.
//!
//! # Examples
//!
//! ## Download a Listing
//!
//! ```rust,no_run
//! use pixie::download::DownloadConfig;
//! use pixie::downloader::{DownloaderBuilder, FetchOptions};
//! use pixie::http::HttpClientConfig;
//! use pixie::illust::{from_iter, Illust};
//!
//! # async fn example() -> pixie::Result<()> {
//! let downloader = DownloaderBuilder::new().build_http(HttpClientConfig::default())?;
//! let listing = from_iter(vec![Illust::new(62781001), Illust::new(62781002)]);
//!
//! downloader.add_fetch_task(
//!     listing,
//!     FetchOptions::new()
//!         .name("uid=7703097")
//!         .download(DownloadConfig::new("downloads")),
//! );
//! downloader.spawn_workers(4)?;
//! downloader.wait().await;
//! downloader.halt_workers().await;
//!
//! for task in downloader.status() {
//!     println!("{}: {}", task.name(), task.status());
//! }
//! # Ok(())
//! # }
//! ```

use super::config::{DownloaderConfig, FailurePolicy, FetchOptions};
use crate::download::DownloadExecutor;
use crate::error::{Error, Result};
use crate::illust::IllustStream;
use crate::progress::{ProgressDisplay, StyleOptions};
use crate::queue::worker::{WorkerContext, WorkerPool};
use crate::queue::TaskQueue;
use crate::task::{Summary, TaskId, TaskSnapshot};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Represents the download controller.
///
/// Submitted listings become fetch tasks; workers expand them into one
/// download task per illust and run those through the executor. Errors
/// never reach the caller directly, they are stored on the failed task and
/// show up in [`status`](Self::status).
///
/// Cloning is cheap and shares the queue and the workers.
#[derive(Clone)]
pub struct Downloader {
    context: Arc<WorkerContext>,
    pool: Arc<Mutex<Option<WorkerPool>>>,
    config: DownloaderConfig,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig, executor: Arc<dyn DownloadExecutor>) -> Self {
        let context = WorkerContext {
            queue: TaskQueue::new(),
            executor,
            progress: ProgressDisplay::new(config.style_options.clone()),
            failure_policy: config.failure_policy,
            on_complete: config.on_complete.clone(),
        };
        Self {
            context: Arc::new(context),
            pool: Arc::new(Mutex::new(None)),
            config,
        }
    }

    fn lock_pool(&self) -> MutexGuard<'_, Option<WorkerPool>> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the number of workers started by [`start`](Self::start).
    pub fn workers(&self) -> usize {
        self.config.workers
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    pub fn style_options(&self) -> &StyleOptions {
        &self.config.style_options
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// The progress display shared by the workers.
    pub fn progress(&self) -> &ProgressDisplay {
        &self.context.progress
    }

    /// Submit a listing. The fetch task is visible to workers on return.
    pub fn add_fetch_task(&self, source: IllustStream, options: FetchOptions) -> TaskId {
        let FetchOptions {
            name,
            query,
            download,
        } = options;
        let id = self
            .context
            .queue
            .add_root(name, source, query, Arc::new(download));
        debug!(task_id = %id, "Listing submitted");
        id
    }

    /// Start `n` workers on the current tokio runtime. Returns once they
    /// are spawned.
    ///
    /// Fails with [`Error::WorkersAlreadySpawned`] while earlier workers are
    /// alive and with [`Error::InvalidWorkerCount`] when `n` is zero.
    pub fn spawn_workers(&self, n: usize) -> Result<()> {
        let mut pool = self.lock_pool();
        if pool.as_ref().is_some_and(WorkerPool::is_running) {
            return Err(Error::WorkersAlreadySpawned);
        }
        *pool = Some(WorkerPool::spawn(&self.context, n)?);
        Ok(())
    }

    /// Start the configured number of workers.
    pub fn start(&self) -> Result<()> {
        self.spawn_workers(self.config.workers)
    }

    /// Signal every worker to stop and wait for all of them to exit.
    ///
    /// Workers finish their current task first. Tasks not yet picked up
    /// stay pending and run after the next [`spawn_workers`](Self::spawn_workers).
    /// Without workers this is a no-op.
    pub async fn halt_workers(&self) {
        let pool = self.lock_pool().take();
        let Some(mut pool) = pool else {
            return;
        };
        pool.halt().await;

        if self.all_done() {
            self.context.progress.finish();
        }
    }

    /// Whether any worker is alive.
    pub fn is_running(&self) -> bool {
        self.lock_pool()
            .as_ref()
            .is_some_and(WorkerPool::is_running)
    }

    /// One snapshot per submitted listing, in submission order, with its
    /// download tasks as children.
    pub fn status(&self) -> Vec<TaskSnapshot> {
        self.context.queue.snapshot()
    }

    /// Snapshot of a single task.
    pub fn task(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.context.queue.snapshot_of(id)
    }

    /// Whether every task, listings and downloads, reached a terminal status.
    pub fn all_done(&self) -> bool {
        self.context.queue.all_done()
    }

    /// Number of tasks not picked up by a worker yet.
    pub fn pending_tasks(&self) -> usize {
        self.context.queue.pending_len()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_snapshots(&self.status())
    }

    /// Resolve once [`all_done`](Self::all_done) holds.
    ///
    /// Never resolves if tasks are pending and no worker runs.
    pub async fn wait(&self) {
        self.context.queue.wait().await
    }
}
