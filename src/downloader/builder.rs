//! Builder pattern implementation for creating Downloader instances.
//!
//! This module provides the [`DownloaderBuilder`] struct that configures and
//! creates [`Downloader`] instances: the number of workers, the failure
//! policy, progress display and the completion callback. The executor doing
//! the transfers is handed over last, in [`DownloaderBuilder::build`].
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust,no_run
//! use pixie::downloader::DownloaderBuilder;
//! use pixie::http::HttpClientConfig;
//!
//! # fn example() -> pixie::Result<()> {
//! let downloader = DownloaderBuilder::new()
//!     .workers(8)
//!     .build_http(HttpClientConfig::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Stop on the First Failure
//!
//! ```rust,no_run
//! use pixie::downloader::{DownloaderBuilder, FailurePolicy};
//! use pixie::download::HttpDownloader;
//! use pixie::http::HttpClientConfig;
//! use pixie::task::Status;
//!
//! # fn example() -> pixie::Result<()> {
//! let downloader = DownloaderBuilder::hidden()
//!     .failure_policy(FailurePolicy::HaltOnError)
//!     .on_complete(|task| {
//!         if task.status() == Status::Failure {
//!             eprintln!("{} failed", task.name());
//!         }
//!     })
//!     .build(HttpDownloader::new(HttpClientConfig::default())?);
//! # Ok(())
//! # }
//! ```

use super::config::{DownloaderConfig, FailurePolicy};
use super::downloader::Downloader;
use crate::download::{DownloadExecutor, HttpDownloader};
use crate::error::Result;
use crate::http::HttpClientConfig;
use crate::progress::StyleOptions;
use crate::task::TaskSnapshot;

use std::sync::Arc;

/// A builder used to create a [`Downloader`].
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden() -> Self {
        let mut builder = DownloaderBuilder::default();
        builder.config.style_options = StyleOptions::hidden();
        builder
    }

    /// Set the number of workers started by [`Downloader::start`].
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Set the downloader style options.
    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Set callback for when each task completes.
    ///
    /// Called from the worker that finished the task, once per task, right
    /// after its terminal status is recorded. A panicking callback is logged
    /// and ignored.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TaskSnapshot) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build<E>(self, executor: E) -> Downloader
    where
        E: DownloadExecutor + 'static,
    {
        Downloader::new(self.config, Arc::new(executor))
    }

    /// Create a [`Downloader`] storing illusts through an [`HttpDownloader`].
    pub fn build_http(self, http: HttpClientConfig) -> Result<Downloader> {
        Ok(self.build(HttpDownloader::new(http)?))
    }
}
