//! Error handling for the pixie library.
//!
//! This module provides centralized error handling. Errors raised while a
//! task executes are never returned to the caller directly; they are stored
//! on the task (as an `Arc<Error>`) and surface through the status snapshots.

use std::io;
use thiserror::Error;

/// Errors that can happen when using pixie.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Captures internal errors that don't fit into other categories.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O Error.
    ///
    /// Wraps standard I/O errors raised while creating, writing or removing
    /// downloaded files.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the HTTP middleware stack (retry, tracing).
    #[error("HTTP middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The gallery API or an illust listing reported an error.
    #[error("API error: {0}")]
    Api(String),

    /// The connection ended before the announced body length was received.
    #[error("Unexpected connection interruption ({received}/{expected} bytes)")]
    Interrupted {
        /// Announced body length.
        expected: u64,
        /// Bytes actually received.
        received: u64,
    },

    /// Every attempt at downloading an illust failed.
    #[error("Failed to download illust {illust_id}")]
    Download {
        /// The illust being downloaded.
        illust_id: u64,
        /// The error raised by the last attempt.
        #[source]
        source: Box<Error>,
    },

    /// Frame conversion failed or no converter is available.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// A file name template could not be rendered.
    #[error("Invalid name template: {0}")]
    Template(String),

    /// An ordering key could not be parsed.
    #[error("Invalid ordering field: {0}")]
    InvalidOrder(String),

    /// `spawn_workers` was called while workers are still alive.
    #[error("Workers already been spawned")]
    WorkersAlreadySpawned,

    /// `spawn_workers` was called with zero workers.
    #[error("The number of workers must be at least 1")]
    InvalidWorkerCount,

    /// A task panicked while executing; the worker survived.
    #[error("Task panicked: {0}")]
    Panicked(String),
}

/// Result type alias for operations that can fail with a pixie error.
pub type Result<T> = std::result::Result<T, Error>;
