//! Example printing the task tree of a downloader as a table.
//!
//! Runs three listings through a fake executor that sleeps a little and
//! fails now and then, so no network access is needed.

use async_trait::async_trait;
use color_eyre::Result;
use comfy_table::Table;
use console::style;
use pixie::download::{DownloadExecutor, DownloadJob, PageOutcome};
use pixie::downloader::{DownloaderBuilder, FetchOptions};
use pixie::illust::{from_iter, Illust, OrderBy, Query, Q};
use pixie::progress::ProgressDisplay;
use pixie::{Status, TaskSnapshot};
use rand::Rng;
use std::time::Duration;

struct FakeExecutor;

#[async_trait]
impl DownloadExecutor for FakeExecutor {
    async fn download(
        &self,
        job: &DownloadJob,
        _progress: &ProgressDisplay,
    ) -> pixie::Result<Vec<PageOutcome>> {
        let (delay, fail) = {
            let mut rng = rand::rng();
            (rng.random_range(50..400), rng.random_bool(0.1))
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if fail {
            return Err(pixie::Error::Api(format!(
                "illust {} is no longer available",
                job.illust.id
            )));
        }
        Ok(Vec::new())
    }
}

fn listing(user_id: u64, first: u64, count: u64) -> Vec<Illust> {
    (first..first + count)
        .map(|id| Illust {
            user_id,
            total_bookmarks: id % 7 * 100,
            tags: if id % 5 == 0 { vec!["R-18".into()] } else { Vec::new() },
            ..Illust::new(id)
        })
        .collect()
}

fn styled_status(status: Status) -> String {
    match status {
        Status::Pending => style("PENDING").dim().to_string(),
        Status::Running => style("RUNNING").cyan().to_string(),
        Status::Success => style("SUCCESS").green().to_string(),
        Status::Failure => style("FAILURE").red().bold().to_string(),
    }
}

fn add_rows(table: &mut Table, task: &TaskSnapshot, depth: usize) {
    let error = task
        .exception()
        .map(|e| e.to_string())
        .unwrap_or_default();
    table.add_row(vec![
        format!("{}{}", "  ".repeat(depth), task.name()),
        format!("{:?}", task.kind()),
        styled_status(task.status()),
        error,
    ]);
    for child in task.children() {
        add_rows(table, child, depth + 1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let downloader = DownloaderBuilder::new()
        .workers(4)
        .on_complete(|task| {
            if task.status() == Status::Failure {
                eprintln!("{} {}", style("failed").red(), task.name());
            }
        })
        .build(FakeExecutor);

    downloader.add_fetch_task(
        from_iter(listing(7703097, 62781001, 8)),
        FetchOptions::new().name("uid=7703097"),
    );
    downloader.add_fetch_task(
        from_iter(listing(1234, 70000001, 12)),
        FetchOptions::new()
            .name("uid=1234, no R-18")
            .query(Query::new().exclude(Q::tag("R-18"))),
    );
    downloader.add_fetch_task(
        from_iter(listing(5678, 80000001, 20)),
        FetchOptions::new().query(
            Query::new()
                .order_by(["-total_bookmarks".parse::<OrderBy>()?])
                .limit_after(5),
        ),
    );

    downloader.start()?;
    downloader.wait().await;
    downloader.halt_workers().await;

    let mut table = Table::new();
    table.set_header(vec!["Task", "Kind", "Status", "Error"]);
    for task in downloader.status() {
        add_rows(&mut table, &task, 0);
    }
    println!("{table}");

    let summary = downloader.summary();
    println!(
        "{} succeeded, {} failed out of {} tasks",
        style(summary.success).green(),
        style(summary.failure).red(),
        summary.total()
    );

    Ok(())
}
