//! Task queue and worker pool.
//!
//! - `queue` - [`TaskQueue`], the shared FIFO and task arena
//! - `expand` - Turns a fetch task into download tasks
//! - `worker` - Tokio workers pulling from the queue

mod expand;
pub(crate) mod queue;
pub(crate) mod worker;

pub use queue::TaskQueue;
