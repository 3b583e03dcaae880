//! Task queue behavior observed through the downloader.
//!
//! These tests submit listings, run real tokio workers against test
//! executors and check the resulting task trees.

use pixie::downloader::{DownloaderBuilder, FailurePolicy, FetchOptions};
use pixie::{Error, Status, TaskKind, TaskSnapshot};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::helpers::*;

fn assert_exception_matches_status(tasks: &[TaskSnapshot]) {
    for task in tasks.iter().flat_map(TaskSnapshot::iter) {
        assert_eq!(
            task.exception().is_some(),
            task.status() == Status::Failure,
            "task {} has status {} and exception {:?}",
            task.name(),
            task.status(),
            task.exception()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_listing_three_illusts() {
    init_tracing();
    let executor = RecordingExecutor::new();
    let downloader = create_hidden_downloader(executor.clone());

    downloader.add_fetch_task(
        create_test_listing(1, 3),
        FetchOptions::new().name(TEST_UID_NAME),
    );
    downloader.spawn_workers(2).unwrap();
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    let status = downloader.status();
    assert_eq!(status.len(), 1);
    let root = &status[0];
    assert_eq!(root.name(), TEST_UID_NAME);
    assert_eq!(root.kind(), TaskKind::Fetch);
    assert_eq!(root.status(), Status::Success);
    assert!(root.exception().is_none());
    assert_eq!(root.children().len(), 3);
    for child in root.children() {
        assert_eq!(child.kind(), TaskKind::Download);
        assert_eq!(child.status(), Status::Success);
        assert!(child.exception().is_none());
    }
    assert!(downloader.all_done());
    assert_eq!(downloader.progress().position(), (3, 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_listings_many_workers() {
    const LISTINGS: u64 = 6;
    const ILLUSTS: u64 = 15;

    let executor = RecordingExecutor::with_jitter(5);
    let downloader = create_hidden_downloader(executor.clone());

    for listing in 0..LISTINGS {
        downloader.add_fetch_task(
            create_test_listing(listing * 1000, ILLUSTS),
            FetchOptions::new(),
        );
    }
    downloader.spawn_workers(4).unwrap();
    wait_all_done(&downloader, 30).await;
    downloader.halt_workers().await;

    let summary = downloader.summary();
    assert_eq!(summary.fetch_tasks, LISTINGS as usize);
    assert_eq!(summary.download_tasks, (LISTINGS * ILLUSTS) as usize);
    assert_eq!(summary.success, summary.total());
    assert!(summary.is_done());

    let names: Vec<_> = downloader
        .status()
        .iter()
        .map(|task| task.name().to_string())
        .collect();
    assert_eq!(names[0], "Task 1");
    assert_eq!(names[5], "Task 6");

    let calls = executor.calls();
    assert_eq!(calls.len(), (LISTINGS * ILLUSTS) as usize);
    assert_eq!(calls.iter().collect::<HashSet<_>>().len(), calls.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_listing_failing_after_k_items() {
    let executor = RecordingExecutor::new();
    let downloader = create_hidden_downloader(executor.clone());

    let id = downloader.add_fetch_task(create_failing_listing(1, 4), FetchOptions::new());
    downloader.spawn_workers(3).unwrap();
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    let root = downloader.task(id).unwrap();
    assert_eq!(root.status(), Status::Failure);
    assert!(matches!(
        root.exception().map(|e| &**e),
        Some(Error::Api(msg)) if msg == "listing interrupted"
    ));
    assert_eq!(root.children().len(), 4);
    assert!(root
        .children()
        .iter()
        .all(|child| child.status() == Status::Success));
    assert_eq!(executor.count_of(5), 0);
    assert_exception_matches_status(&downloader.status());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_download_leaves_siblings_alone() {
    let executor = RecordingExecutor::failing(&[2]);
    let downloader = create_hidden_downloader(executor.clone());

    downloader.add_fetch_task(create_test_listing(1, 3), FetchOptions::new());
    downloader.spawn_workers(2).unwrap();
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    let root = &downloader.status()[0];
    assert_eq!(root.status(), Status::Success);
    for child in root.children() {
        let expected = match child.illust_id() {
            Some(2) => Status::Failure,
            _ => Status::Success,
        };
        assert_eq!(child.status(), expected);
    }
    assert_eq!(downloader.summary().failure, 1);
    assert_exception_matches_status(&downloader.status());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_executor_keeps_workers_alive() {
    let executor = RecordingExecutor::panicking(&[1, 3]);
    let downloader = create_hidden_downloader(executor.clone());

    downloader.add_fetch_task(create_test_listing(1, 5), FetchOptions::new());
    downloader.spawn_workers(1).unwrap();
    wait_all_done(&downloader, 10).await;
    assert!(downloader.is_running());
    downloader.halt_workers().await;

    let root = &downloader.status()[0];
    let failed: Vec<_> = root
        .children()
        .iter()
        .filter(|child| child.status() == Status::Failure)
        .map(|child| child.illust_id())
        .collect();
    assert_eq!(failed, vec![Some(1), Some(3)]);
    assert!(root.children().iter().all(|child| match child.status() {
        Status::Failure => matches!(child.exception().map(|e| &**e), Some(Error::Panicked(_))),
        _ => true,
    }));
    assert_eq!(executor.calls().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_halt_then_respawn_runs_each_task_once() {
    const ILLUSTS: u64 = 40;
    let executor = RecordingExecutor::with_jitter(10);
    let downloader = create_hidden_downloader(executor.clone());

    downloader.add_fetch_task(create_test_listing(1, ILLUSTS), FetchOptions::new());
    downloader.spawn_workers(2).unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    downloader.halt_workers().await;
    assert!(!downloader.is_running());

    let halted = downloader.summary();
    assert_eq!(halted.running, 0);
    assert_eq!(halted.success + halted.failure + halted.pending, halted.total());

    downloader.spawn_workers(3).unwrap();
    wait_all_done(&downloader, 30).await;
    downloader.halt_workers().await;

    let summary = downloader.summary();
    assert_eq!(summary.download_tasks, ILLUSTS as usize);
    assert_eq!(summary.success, summary.total());
    for id in 1..=ILLUSTS {
        assert_eq!(executor.count_of(id), 1, "illust {} ran more than once", id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_halt_on_error_leaves_remaining_tasks_pending() {
    let executor = RecordingExecutor::failing(&[1]);
    let downloader = DownloaderBuilder::hidden()
        .failure_policy(FailurePolicy::HaltOnError)
        .build(executor.clone());

    downloader.add_fetch_task(create_test_listing(1, 20), FetchOptions::new());
    downloader.spawn_workers(1).unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        while downloader.is_running() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("workers did not halt");

    let summary = downloader.summary();
    assert_eq!(summary.failure, 1);
    assert_eq!(summary.pending, 19);
    assert!(!downloader.all_done());
    assert_eq!(executor.calls(), vec![1]);

    // Halted workers can be replaced.
    downloader.halt_workers().await;
    downloader.spawn_workers(1).unwrap();
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    let summary = downloader.summary();
    assert_eq!(summary.success, 20);
    assert_eq!(summary.failure, 1);
    assert_eq!(executor.count_of(1), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_status_never_torn() {
    let executor = RecordingExecutor::failing(&(1..=60u64).filter(|id| id % 3 == 0).collect::<Vec<_>>());
    let downloader = create_hidden_downloader(executor);

    downloader.add_fetch_task(create_test_listing(1, 30), FetchOptions::new());
    downloader.add_fetch_task(create_failing_listing(31, 30), FetchOptions::new());
    downloader.spawn_workers(4).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let downloader = downloader.clone();
            tokio::spawn(async move {
                while !downloader.all_done() {
                    assert_exception_matches_status(&downloader.status());
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    wait_all_done(&downloader, 30).await;
    for reader in readers {
        reader.await.unwrap();
    }
    downloader.halt_workers().await;

    let status = downloader.status();
    assert_exception_matches_status(&status);
    assert_eq!(status[0].children().len(), 30);
    assert_eq!(status[1].children().len(), 30);
    assert_eq!(status[1].status(), Status::Failure);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_on_complete_sees_every_task() {
    let completed = Arc::new(AtomicUsize::new(0));
    let downloads = Arc::new(AtomicUsize::new(0));
    let downloader = {
        let completed = completed.clone();
        let downloads = downloads.clone();
        DownloaderBuilder::hidden()
            .on_complete(move |task| {
                assert!(task.status().is_terminal());
                completed.fetch_add(1, Ordering::SeqCst);
                if task.kind() == TaskKind::Download {
                    downloads.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build(RecordingExecutor::new())
    };

    downloader.add_fetch_task(create_test_listing(1, 4), FetchOptions::new());
    downloader.add_fetch_task(create_test_listing(10, 2), FetchOptions::new());
    downloader.spawn_workers(2).unwrap();
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    assert_eq!(completed.load(Ordering::SeqCst), 8);
    assert_eq!(downloads.load(Ordering::SeqCst), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tasks_added_while_running_are_picked_up() {
    let executor = RecordingExecutor::new();
    let downloader = create_hidden_downloader(executor.clone());
    downloader.spawn_workers(2).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    downloader.add_fetch_task(create_test_listing(1, 3), FetchOptions::new());
    wait_all_done(&downloader, 10).await;

    downloader.add_fetch_task(create_test_listing(100, 2), FetchOptions::new());
    wait_all_done(&downloader, 10).await;
    downloader.halt_workers().await;

    assert_eq!(executor.calls().len(), 5);
    assert_eq!(downloader.status().len(), 2);
}
