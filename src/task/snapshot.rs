//! Point-in-time views of the task tree.

use super::task::{Status, TaskId, TaskKind};
use crate::error::Error;

use std::sync::Arc;

/// Copy of a task taken under the queue lock.
///
/// `status` and `exception` are always read together, so a snapshot with a
/// `Failure` status always carries the error and no other snapshot does.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub(crate) id: TaskId,
    pub(crate) kind: TaskKind,
    pub(crate) name: String,
    pub(crate) illust_id: Option<u64>,
    pub(crate) parent: Option<TaskId>,
    pub(crate) status: Status,
    pub(crate) exception: Option<Arc<Error>>,
    pub(crate) children: Vec<TaskSnapshot>,
}

impl TaskSnapshot {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Illust handled by a download task. `None` for fetch tasks.
    pub fn illust_id(&self) -> Option<u64> {
        self.illust_id
    }

    /// Fetch task a download task was expanded from. `None` for fetch tasks.
    pub fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn exception(&self) -> Option<&Arc<Error>> {
        self.exception.as_ref()
    }

    pub fn children(&self) -> &[TaskSnapshot] {
        &self.children
    }

    /// Whether this task and all of its children reached a terminal status.
    pub fn is_done(&self) -> bool {
        self.status.is_terminal() && self.children.iter().all(TaskSnapshot::is_done)
    }

    /// This task followed by all of its descendants, depth first.
    pub fn iter(&self) -> impl Iterator<Item = &TaskSnapshot> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Aggregate task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub pending: usize,
    pub running: usize,
    pub success: usize,
    pub failure: usize,
    pub fetch_tasks: usize,
    pub download_tasks: usize,
}

impl Summary {
    pub fn from_snapshots(snapshots: &[TaskSnapshot]) -> Self {
        let mut summary = Summary::default();
        for task in snapshots.iter().flat_map(TaskSnapshot::iter) {
            match task.status {
                Status::Pending => summary.pending += 1,
                Status::Running => summary.running += 1,
                Status::Success => summary.success += 1,
                Status::Failure => summary.failure += 1,
            }
            match task.kind {
                TaskKind::Fetch => summary.fetch_tasks += 1,
                TaskKind::Download => summary.download_tasks += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.fetch_tasks + self.download_tasks
    }

    pub fn is_done(&self) -> bool {
        self.pending == 0 && self.running == 0
    }
}
