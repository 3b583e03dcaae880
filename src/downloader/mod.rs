//! Downloader module containing the task-tracking downloader, its builder
//! and configuration.
//!
//! # Overview
//!
//! - `downloader` - The [`Downloader`], owning the task queue and workers
//! - `builder` - [`DownloaderBuilder`] for configuring a downloader
//! - `config` - Configuration structures, [`FetchOptions`] and callback types
//!
//! # Examples
//!
//! ```rust,no_run
//! use pixie::downloader::{DownloaderBuilder, FetchOptions};
//! use pixie::http::HttpClientConfig;
//! use pixie::illust::{from_iter, Illust, Query, Q};
//!
//! # async fn example() -> pixie::Result<()> {
//! let downloader = DownloaderBuilder::hidden().build_http(HttpClientConfig::default())?;
//! downloader.add_fetch_task(
//!     from_iter(vec![Illust::new(1), Illust::new(2)]),
//!     FetchOptions::new().query(Query::new().exclude(Q::tag("R-18"))),
//! );
//! downloader.start()?;
//! downloader.wait().await;
//! println!("{:?}", downloader.summary());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;

pub use builder::DownloaderBuilder;
pub use config::{DownloaderConfig, FailurePolicy, FetchOptions, TaskCallback};
pub use downloader::Downloader;
