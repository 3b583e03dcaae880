//! Pixie queries illustration listings and downloads them with a
//! concurrent task queue.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pixie::download::DownloadConfig;
//! use pixie::downloader::{DownloaderBuilder, FetchOptions};
//! use pixie::http::HttpClientConfig;
//! use pixie::illust::{from_iter, Illust, OrderBy, Query};
//!
//! # #[tokio::main]
//! # async fn main() -> pixie::Result<()> {
//! let downloader = DownloaderBuilder::new().build_http(HttpClientConfig::default())?;
//!
//! let listing = from_iter(vec![Illust::new(62781001)]);
//! let query = Query::new()
//!     .order_by(["-total_bookmarks".parse::<OrderBy>()?])
//!     .limit_after(20);
//! downloader.add_fetch_task(
//!     listing,
//!     FetchOptions::new()
//!         .query(query)
//!         .download(DownloadConfig::new("output")),
//! );
//!
//! downloader.start()?;
//! downloader.wait().await;
//! downloader.halt_workers().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`illust`] - Illust records, listing streams and the query builder
//! - [`downloader`] - The [`Downloader`] and its builder
//! - [`download`] - The executor seam and the HTTP executor
//! - [`task`] - Task identifiers, statuses and snapshots
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client creation
//! - [`progress`] - Progress bar styling and display management
//! - [`utils`] - Shared utility functions

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod illust;
pub mod progress;
pub(crate) mod queue;
pub mod task;
pub mod utils;

pub use download::{DownloadConfig, DownloadExecutor, DownloadJob, HttpDownloader, PageOutcome};
pub use downloader::{Downloader, DownloaderBuilder, FailurePolicy, FetchOptions};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use illust::{Illust, IllustStream, OrderBy, Query, Q};
pub use progress::{ProgressBarOpts, StyleOptions};
pub use task::{Status, Summary, TaskId, TaskKind, TaskSnapshot};
