use sqlx::SqlitePool;

use super::*;
use crate::{connect_pool, run_migrations, PoolConfig};

async fn test_pool() -> SqlitePool {
    let config = PoolConfig {
        max_connections: 1,
        min_connections: 1,
        acquire_timeout_secs: 5,
    };
    let pool = connect_pool("sqlite::memory:", config)
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations apply");
    pool
}

#[tokio::test]
async fn run_lifecycle_queued_running_completed() {
    let pool = test_pool().await;

    let run = create_ingest_run(&pool, "cli").await.unwrap();
    assert_eq!(run.status, "queued");
    assert_eq!(run.trigger_source, "cli");
    assert!(run.started_at.is_none());

    start_ingest_run(&pool, run.id).await.unwrap();
    complete_ingest_run(&pool, run.id, 42).await.unwrap();

    let runs = list_recent_ingest_runs(&pool, 10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "completed");
    assert_eq!(runs[0].posts_stored, 42);
    assert!(runs[0].completed_at.is_some());
}

#[tokio::test]
async fn start_twice_is_an_invalid_transition() {
    let pool = test_pool().await;
    let run = create_ingest_run(&pool, "cli").await.unwrap();
    start_ingest_run(&pool, run.id).await.unwrap();

    let err = start_ingest_run(&pool, run.id).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidIngestRunTransition { id, .. } if id == run.id
    ));
}

#[tokio::test]
async fn fail_from_running_records_message() {
    let pool = test_pool().await;
    let run = create_ingest_run(&pool, "scheduler").await.unwrap();
    start_ingest_run(&pool, run.id).await.unwrap();
    fail_ingest_run(&pool, run.id, "source unreachable")
        .await
        .unwrap();

    let runs = list_recent_ingest_runs(&pool, 1).await.unwrap();
    assert_eq!(runs[0].status, "failed");
    assert_eq!(runs[0].error_message.as_deref(), Some("source unreachable"));
}

#[tokio::test]
async fn completed_run_cannot_fail() {
    let pool = test_pool().await;
    let run = create_ingest_run(&pool, "cli").await.unwrap();
    start_ingest_run(&pool, run.id).await.unwrap();
    complete_ingest_run(&pool, run.id, 0).await.unwrap();

    assert!(fail_ingest_run(&pool, run.id, "late error").await.is_err());
}

#[tokio::test]
async fn list_recent_is_newest_first_and_limited() {
    let pool = test_pool().await;
    for _ in 0..3 {
        create_ingest_run(&pool, "cli").await.unwrap();
    }

    let runs = list_recent_ingest_runs(&pool, 2).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs[0].id > runs[1].id);
}
