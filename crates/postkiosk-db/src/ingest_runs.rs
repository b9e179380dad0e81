//! Database operations for the `ingest_runs` ledger.
//!
//! One row per `ingest_all` batch, whatever triggered it (CLI, periodic
//! scheduler, manual refresh). Lifecycle: queued -> running -> completed
//! or failed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `ingest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestRunRow {
    pub id: i64,
    pub public_id: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub posts_stored: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, \
                           started_at, completed_at, posts_stored, error_message, created_at";

/// Creates a new ingest run in `queued` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingest_run(
    pool: &SqlitePool,
    trigger_source: &str,
) -> Result<IngestRunRow, DbError> {
    let public_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "INSERT INTO ingest_runs (public_id, trigger_source, status, created_at) \
         VALUES (?, ?, 'queued', ?) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(trigger_source)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and stamps `started_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not in
/// `queued` status, or [`DbError::Sqlx`] if the update fails.
pub async fn start_ingest_run(pool: &SqlitePool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs SET status = 'running', started_at = ? \
         WHERE id = ? AND status = 'queued'",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `completed` with its stored-post count.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not in
/// `running` status, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_ingest_run(
    pool: &SqlitePool,
    id: i64,
    posts_stored: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs SET status = 'completed', completed_at = ?, posts_stored = ? \
         WHERE id = ? AND status = 'running'",
    )
    .bind(Utc::now())
    .bind(posts_stored)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message. Valid from either `queued`
/// or `running` status.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is already
/// terminal, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingest_run(pool: &SqlitePool, id: i64, error: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs SET status = 'failed', completed_at = ?, error_message = ? \
         WHERE id = ? AND status IN ('queued', 'running')",
    )
    .bind(Utc::now())
    .bind(error)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "queued or running",
        });
    }

    Ok(())
}

/// The most recent ingest runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_ingest_runs(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<IngestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs ORDER BY created_at DESC, id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
#[path = "ingest_runs_test.rs"]
mod ingest_runs_test;
