//! Tasks tracked by the downloader.
//!
//! A fetch task walks one listing and spawns a download task per illust.
//! Callers never touch tasks directly; they read [`TaskSnapshot`]s copied
//! out of the queue.

pub(crate) mod task;
pub mod snapshot;

pub use snapshot::{Summary, TaskSnapshot};
pub use task::{Status, TaskId, TaskKind};
