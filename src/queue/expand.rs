//! Fetch task expansion.

use super::queue::TaskQueue;
use crate::download::{DownloadConfig, DownloadJob};
use crate::error::Result;
use crate::illust::{IllustStream, Query};
use crate::progress::ProgressDisplay;
use crate::task::TaskId;

use futures::StreamExt;
use std::sync::Arc;
use tracing::trace;

/// Walk the listing of fetch task `parent`, shaped by `query`, and enqueue
/// one download task per illust.
///
/// Returns the number of children created. On a listing error the children
/// already enqueued stay valid and the error is returned.
pub(crate) async fn expand_fetch(
    queue: &TaskQueue,
    parent: TaskId,
    source: IllustStream,
    query: &Query,
    download: Arc<DownloadConfig>,
    progress: &ProgressDisplay,
) -> Result<usize> {
    let mut illusts = query.apply(source);
    let mut order = 0;

    while let Some(illust) = illusts.next().await {
        let illust = illust?;
        order += 1;
        let illust_id = illust.id;
        let child = queue.attach_child(
            parent,
            DownloadJob {
                illust: Arc::new(illust),
                order,
                config: Arc::clone(&download),
            },
        );
        progress.add_pending(1);
        trace!(task_id = %child, parent = %parent, illust_id, order, "Download task enqueued");
    }

    Ok(order)
}
