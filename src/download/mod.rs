//! Download executors and their configuration.
//!
//! - [`executor`] - The [`DownloadExecutor`] trait called by download tasks
//! - [`config`] - [`DownloadConfig`], shared by every download of a listing
//! - [`naming`] - Target path and file name template rendering
//! - [`http`] - [`HttpDownloader`], the executor writing pages to disk
//!
//! # Examples
//!
//! A custom executor only has to implement [`DownloadExecutor`]:
//!
//! ```rust
//! use async_trait::async_trait;
//! use pixie::download::{DownloadExecutor, DownloadJob, PageOutcome};
//! use pixie::progress::ProgressDisplay;
//!
//! struct DryRun;
//!
//! #[async_trait]
//! impl DownloadExecutor for DryRun {
//!     async fn download(
//!         &self,
//!         job: &DownloadJob,
//!         _progress: &ProgressDisplay,
//!     ) -> pixie::Result<Vec<PageOutcome>> {
//!         println!("would download illust {}", job.illust.id);
//!         Ok(Vec::new())
//!     }
//! }
//! ```

pub mod config;
pub mod executor;
pub mod http;
pub mod naming;

pub use config::DownloadConfig;
pub use executor::{DownloadExecutor, DownloadJob, FrameConverter, PageOutcome};
pub use http::HttpDownloader;
