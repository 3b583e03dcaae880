//! Shared FIFO and task arena.

use crate::download::{DownloadConfig, DownloadJob};
use crate::error::Result;
use crate::illust::{IllustStream, Query};
use crate::task::task::{Payload, Task};
use crate::task::{TaskId, TaskSnapshot};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    tasks: HashMap<TaskId, Task>,
    roots: Vec<TaskId>,
    pending: VecDeque<TaskId>,
}

impl State {
    fn snapshot(&self, id: TaskId) -> Option<TaskSnapshot> {
        let task = self.tasks.get(&id)?;
        Some(TaskSnapshot {
            id: task.id,
            kind: task.kind,
            name: task.name.clone(),
            illust_id: task.illust_id,
            parent: task.parent,
            status: task.status,
            exception: task.exception.clone(),
            children: task
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    fn push(&mut self, task: Task) -> TaskId {
        let id = task.id;
        self.tasks.insert(id, task);
        self.pending.push_back(id);
        id
    }
}

/// Thread-safe FIFO of pending tasks, plus every task ever submitted.
///
/// All status changes go through [`start`](Self::start),
/// [`finish`](Self::finish) and [`attach_child`](Self::attach_child), each
/// performed under one lock. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<State>,
    /// A task was pushed.
    available: Notify,
    /// A task reached a terminal status.
    changed: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Workers never panic while holding the lock, the state stays valid.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a root fetch task. Unnamed roots are called `Task {n}`.
    pub(crate) fn add_root(
        &self,
        name: Option<String>,
        source: IllustStream,
        query: Query,
        download: Arc<DownloadConfig>,
    ) -> TaskId {
        let id = {
            let mut state = self.lock();
            let name = name.unwrap_or_else(|| format!("Task {}", state.roots.len() + 1));
            let task = Task::fetch(name, source, query, download);
            state.roots.push(task.id);
            state.push(task)
        };
        debug!(task_id = %id, "Fetch task enqueued");
        self.available.notify_one();
        id
    }

    /// Create a download task under `parent` and enqueue it.
    pub(crate) fn attach_child(&self, parent: TaskId, job: DownloadJob) -> TaskId {
        let id = {
            let mut state = self.lock();
            let task = Task::download(parent, job);
            let id = task.id;
            if let Some(parent) = state.tasks.get_mut(&parent) {
                parent.children.push(id);
            }
            state.push(task)
        };
        self.available.notify_one();
        id
    }

    /// Pop the oldest pending task without waiting.
    pub fn try_pop(&self) -> Option<TaskId> {
        let mut state = self.lock();
        let id = state.pending.pop_front()?;
        if !state.pending.is_empty() {
            self.available.notify_one();
        }
        Some(id)
    }

    /// Wait for the next pending task.
    ///
    /// Returns `None` once `halt` is cancelled. Cancel safe: a task is only
    /// popped in the poll that returns it.
    pub async fn next(&self, halt: &CancellationToken) -> Option<TaskId> {
        loop {
            if halt.is_cancelled() {
                return None;
            }

            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(id) = self.try_pop() {
                return Some(id);
            }

            tokio::select! {
                biased;
                _ = halt.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Number of tasks waiting to be popped.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Mark a popped task as running and hand over its payload.
    pub(crate) fn start(&self, id: TaskId) -> Option<Payload> {
        self.lock().tasks.get_mut(&id)?.start()
    }

    /// Record the outcome of a running task.
    ///
    /// Returns the task's snapshot after the transition, or `None` if the
    /// task was not running.
    pub(crate) fn finish(&self, id: TaskId, result: Result<()>) -> Option<TaskSnapshot> {
        let snapshot = {
            let mut state = self.lock();
            if !state.tasks.get_mut(&id)?.finish(result) {
                return None;
            }
            state.snapshot(id)
        };
        self.changed.notify_waiters();
        snapshot
    }

    /// One snapshot per root task, in submission order.
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        let state = self.lock();
        state
            .roots
            .iter()
            .filter_map(|id| state.snapshot(*id))
            .collect()
    }

    pub fn snapshot_of(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.lock().snapshot(id)
    }

    /// Whether every known task reached a terminal status.
    pub fn all_done(&self) -> bool {
        self.lock()
            .tasks
            .values()
            .all(|task| task.status.is_terminal())
    }

    /// Resolve once [`all_done`](Self::all_done) holds.
    pub async fn wait(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.all_done() {
                return;
            }
            notified.await;
        }
    }
}
