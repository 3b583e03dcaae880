//! Worker pool executing queued tasks.
//!
//! Each worker is a tokio task looping over [`TaskQueue::next`]. Errors and
//! panics raised while executing a task are caught here and stored on the
//! task, so a worker only stops when its halt token is cancelled.

use super::expand::expand_fetch;
use super::queue::TaskQueue;
use crate::download::DownloadExecutor;
use crate::downloader::config::{FailurePolicy, TaskCallback};
use crate::error::{Error, Result};
use crate::progress::ProgressDisplay;
use crate::task::task::Payload;
use crate::task::{TaskId, TaskKind};

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// State shared by every worker of a downloader.
pub(crate) struct WorkerContext {
    pub(crate) queue: TaskQueue,
    pub(crate) executor: Arc<dyn DownloadExecutor>,
    pub(crate) progress: ProgressDisplay,
    pub(crate) failure_policy: FailurePolicy,
    pub(crate) on_complete: Option<Arc<TaskCallback>>,
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("queue", &self.queue)
            .field("progress", &self.progress)
            .field("failure_policy", &self.failure_policy)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl WorkerContext {
    async fn execute(&self, id: TaskId, payload: Payload) -> Result<()> {
        match payload {
            Payload::Fetch {
                source,
                query,
                download,
            } => {
                let children =
                    expand_fetch(&self.queue, id, source, &query, download, &self.progress)
                        .await?;
                debug!(task_id = %id, children, "Listing completed");
            }
            Payload::Download(job) => {
                let outcomes = self.executor.download(&job, &self.progress).await?;
                let stored = outcomes.iter().filter(|o| o.downloaded).count();
                debug!(
                    task_id = %id,
                    illust_id = job.illust.id,
                    pages = outcomes.len(),
                    stored,
                    "Illust downloaded"
                );
            }
        }
        Ok(())
    }

    /// Record the outcome of task `id` and apply the failure policy.
    fn complete(&self, id: TaskId, result: Result<()>, halt: &CancellationToken) {
        match &result {
            Ok(()) => debug!(task_id = %id, "Task succeeded"),
            Err(Error::Panicked(msg)) => error!(task_id = %id, "Task panicked: {}", msg),
            Err(e) => warn!(task_id = %id, "Task failed: {}", e),
        }

        let failed = result.is_err();
        let Some(snapshot) = self.queue.finish(id, result) else {
            return;
        };

        if snapshot.kind() == TaskKind::Download {
            self.progress.increment_main();
        }

        if let Some(callback) = &self.on_complete {
            if std::panic::catch_unwind(AssertUnwindSafe(|| (**callback)(&snapshot))).is_err() {
                error!(task_id = %id, "Completion callback panicked");
            }
        }

        if failed && self.failure_policy == FailurePolicy::HaltOnError {
            info!(task_id = %id, "Halting workers after task failure");
            halt.cancel();
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

async fn run_worker(worker: usize, context: Arc<WorkerContext>, halt: CancellationToken) {
    debug!(worker, "Worker started");

    while let Some(id) = context.queue.next(&halt).await {
        let Some(payload) = context.queue.start(id) else {
            continue;
        };
        debug!(worker, task_id = %id, "Task running");

        let result = AssertUnwindSafe(context.execute(id, payload))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::Panicked(panic_message(&*panic))));

        context.complete(id, result, &halt);
    }

    debug!(worker, "Worker stopped");
}

/// A running set of workers. Dropping the pool signals its workers to stop.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    halt: CancellationToken,
}

impl WorkerPool {
    /// Spawn `workers` workers on the current tokio runtime.
    pub(crate) fn spawn(context: &Arc<WorkerContext>, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }
        let runtime = Handle::try_current()
            .map_err(|e| Error::Internal(format!("no tokio runtime available: {}", e)))?;

        let halt = CancellationToken::new();
        let handles = (0..workers)
            .map(|worker| runtime.spawn(run_worker(worker, Arc::clone(context), halt.clone())))
            .collect();
        info!(workers, "Workers spawned");

        Ok(Self { handles, halt })
    }

    /// Whether any worker is still alive.
    pub(crate) fn is_running(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }

    /// Signal every worker and wait until all of them exited. Workers finish
    /// their current task first.
    pub(crate) async fn halt(&mut self) {
        self.halt.cancel();
        for handle in std::mem::take(&mut self.handles) {
            if let Err(e) = handle.await {
                error!("Worker exited abnormally: {}", e);
            }
        }
        info!("Workers halted");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.halt.cancel();
    }
}
