//! HTTP client used by [`HttpDownloader`](crate::download::HttpDownloader).
//!
//! - [`client`] - Client creation with retry and tracing middleware

pub mod client;

pub use client::{create_http_client, HttpClientConfig, IMAGE_REFERER};
