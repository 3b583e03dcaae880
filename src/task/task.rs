//! Task entity and its status machine.

use crate::download::{DownloadConfig, DownloadJob};
use crate::error::{Error, Result};
use crate::illust::{IllustStream, Query};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque task identifier, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Expands a listing into download tasks.
    Fetch,
    /// Stores a single illust.
    Download,
}

/// Task status. Moves forward only: Pending, Running, then Success or
/// Failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Running,
    Success,
    Failure,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "PENDING",
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// Work carried by a task until a worker takes it.
pub(crate) enum Payload {
    Fetch {
        source: IllustStream,
        query: Query,
        download: Arc<DownloadConfig>,
    },
    Download(DownloadJob),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Fetch {
                query, download, ..
            } => f
                .debug_struct("Fetch")
                .field("query", query)
                .field("download", download)
                .finish_non_exhaustive(),
            Payload::Download(job) => f.debug_tuple("Download").field(job).finish(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) kind: TaskKind,
    pub(crate) name: String,
    pub(crate) illust_id: Option<u64>,
    pub(crate) status: Status,
    pub(crate) exception: Option<Arc<Error>>,
    pub(crate) parent: Option<TaskId>,
    pub(crate) children: Vec<TaskId>,
    payload: Option<Payload>,
}

impl Task {
    pub(crate) fn fetch(
        name: String,
        source: IllustStream,
        query: Query,
        download: Arc<DownloadConfig>,
    ) -> Self {
        Self::new(
            TaskKind::Fetch,
            name,
            None,
            None,
            Payload::Fetch {
                source,
                query,
                download,
            },
        )
    }

    pub(crate) fn download(parent: TaskId, job: DownloadJob) -> Self {
        let illust_id = job.illust.id;
        Self::new(
            TaskKind::Download,
            illust_id.to_string(),
            Some(illust_id),
            Some(parent),
            Payload::Download(job),
        )
    }

    fn new(
        kind: TaskKind,
        name: String,
        illust_id: Option<u64>,
        parent: Option<TaskId>,
        payload: Payload,
    ) -> Self {
        Self {
            id: TaskId::next(),
            kind,
            name,
            illust_id,
            status: Status::Pending,
            exception: None,
            parent,
            children: Vec::new(),
            payload: Some(payload),
        }
    }

    /// Pending → Running, handing the payload to the caller.
    ///
    /// Returns `None` if the task already started.
    pub(crate) fn start(&mut self) -> Option<Payload> {
        if self.status != Status::Pending {
            return None;
        }
        self.status = Status::Running;
        self.payload.take()
    }

    /// Running → Success or Failure. Returns `false` if the task was not
    /// running.
    pub(crate) fn finish(&mut self, result: Result<()>) -> bool {
        if self.status != Status::Running {
            return false;
        }
        match result {
            Ok(()) => self.status = Status::Success,
            Err(e) => {
                self.status = Status::Failure;
                self.exception = Some(Arc::new(e));
            }
        }
        true
    }
}
