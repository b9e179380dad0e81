use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::test_support::{MockSource, MockStore};

/// Batches are counted through the source's profile-fetch counter: one
/// tracked handle means exactly one profile fetch per batch.
fn scheduler(
    interval_secs: u64,
) -> (Arc<MockSource>, RefreshScheduler<MockStore, MockSource>) {
    let store = Arc::new(MockStore::default());
    let source = Arc::new(MockSource::default());
    let sched = RefreshScheduler::new(
        Arc::clone(&store),
        Arc::clone(&source),
        vec!["h1".to_owned()],
        Duration::from_secs(interval_secs),
        IngestOptions::default(),
    );
    (source, sched)
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

fn batches(source: &MockSource) -> u32 {
    source.profile_calls.load(Ordering::SeqCst)
}

#[tokio::test(start_paused = true)]
async fn one_batch_per_interval() {
    let (source, sched) = scheduler(5);
    let (handle, join) = sched.spawn();
    settle().await;
    assert_eq!(batches(&source), 0, "nothing before the first interval");

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(batches(&source), 1);

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(batches(&source), 2);

    drop(handle);
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn manual_trigger_runs_immediately_and_resets_the_timer() {
    let (source, sched) = scheduler(5);
    let (handle, join) = sched.spawn();
    settle().await;

    // t=2: manual trigger fires a batch right away.
    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(handle.trigger().await);
    settle().await;
    assert_eq!(batches(&source), 1);

    // t=5: the original periodic slot must NOT fire — the reference point
    // moved to t=2.
    tokio::time::advance(Duration::from_secs(3)).await;
    settle().await;
    assert_eq!(batches(&source), 1);

    // t=7: one interval after the manual trigger.
    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(batches(&source), 2);

    drop(handle);
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_task_promptly() {
    let (_source, sched) = scheduler(3600);
    let (handle, join) = sched.spawn();
    settle().await;

    drop(handle);
    join.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failing_batches_do_not_kill_the_loop() {
    let (source, sched) = scheduler(5);
    // Every profile fetch is throttled well past the wait budget, so every
    // batch fails per-handle; the timer must keep ticking regardless.
    source.rate_limit_budget.store(u32::MAX, Ordering::SeqCst);
    let (handle, join) = sched.spawn();
    settle().await;

    tokio::time::advance(Duration::from_secs(5)).await;
    // Each failed batch sleeps through two capped rate-limit waits.
    tokio::time::advance(Duration::from_secs(20)).await;
    settle().await;
    let after_first = batches(&source);
    assert!(after_first >= 1, "first batch attempted");

    tokio::time::advance(Duration::from_secs(30)).await;
    settle().await;
    assert!(
        batches(&source) > after_first,
        "later periodic batches still run after failures"
    );

    drop(handle);
    join.await.unwrap();
}
