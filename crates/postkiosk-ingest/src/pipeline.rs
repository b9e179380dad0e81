//! The deduplicating ingestion pipeline.
//!
//! Turns raw scraped items into rows in the record store, one post at a
//! time: a failure on post N never discards posts 1..N-1 and never stops
//! post N+1. Re-running with no new upstream data stores nothing — the
//! display engine relies on that idempotence.

use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use postkiosk_core::{normalize_handle, NewPost, PostSource, RawPost, RecordStore, SourceError};
use sha2::{Digest, Sha256};

use crate::error::IngestError;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Hard cap on posts stored per handle per run; excess from the source
    /// is discarded.
    pub max_posts: usize,
    /// How many rate-limit waits to tolerate before giving up on a handle
    /// for the current run.
    pub rate_limit_max_retries: u32,
    /// Upper bound on a single rate-limit wait, whatever the source asks for.
    pub rate_limit_wait_cap_secs: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_posts: 30,
            rate_limit_max_retries: 2,
            rate_limit_wait_cap_secs: 60,
        }
    }
}

/// Outcome of one handle within a batch.
#[derive(Debug)]
pub struct HandleOutcome {
    pub handle: String,
    pub outcome: Result<u64, IngestError>,
}

/// Outcome of an `ingest_all` batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<HandleOutcome>,
}

impl IngestReport {
    /// Total newly stored posts across all handles.
    #[must_use]
    pub fn total_new(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().ok())
            .sum()
    }

    /// Number of handles that failed outright.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_err())
            .count()
    }
}

/// Ingest up to `opts.max_posts` posts for one handle.
///
/// Steps: validate the handle, resolve or create its record from the
/// source's profile snapshot, stream raw posts, and insert each unseen one.
/// Commit is per post, not batched; storage failures on a single post are
/// logged and skipped. Returns the count of newly stored posts.
///
/// # Errors
///
/// - [`IngestError::Validation`] — malformed handle name.
/// - [`IngestError::HandleNotFound`] — the source cannot resolve the handle.
/// - [`IngestError::RateLimitExhausted`] — throttled past the wait budget.
/// - [`IngestError::Source`] — profile or listing fetch failed outright.
/// - [`IngestError::Store`] — the handle row itself could not be written
///   (per-post failures are absorbed, not propagated).
pub async fn ingest_handle<S, P>(
    store: &S,
    source: &P,
    raw_handle: &str,
    opts: &IngestOptions,
) -> Result<u64, IngestError>
where
    S: RecordStore + ?Sized,
    P: PostSource + ?Sized,
{
    let username = normalize_handle(raw_handle)?;

    let profile = match bounded_rate_limit(&username, opts, || source.fetch_profile(&username)).await
    {
        Err(IngestError::Source(SourceError::NotFound { handle })) => {
            return Err(IngestError::HandleNotFound { handle });
        }
        other => other?,
    };
    store.upsert_handle(&profile).await?;

    let raw_posts =
        bounded_rate_limit(&username, opts, || source.fetch_posts(&username, opts.max_posts))
            .await?;

    let mut stored = 0u64;
    for raw in raw_posts.into_iter().take(opts.max_posts) {
        let post_id = post_identity(&username, &raw);

        match store.post_exists(&post_id).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(handle = %username, post_id = %post_id, error = %e,
                    "dedup lookup failed, skipping post");
                continue;
            }
        }

        let new_post = NewPost {
            post_id,
            username: username.clone(),
            content: raw.text,
            created_at: raw.created_at.unwrap_or_else(Utc::now),
            likes_count: raw.likes_count,
            reposts_count: raw.reposts_count,
        };

        match store.insert_post_if_new(&new_post).await {
            Ok(true) => stored += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(handle = %username, post_id = %new_post.post_id, error = %e,
                    "post insert failed, continuing with the rest of the stream");
            }
        }
    }

    tracing::info!(handle = %username, stored, "ingested handle");
    Ok(stored)
}

/// Ingest every handle in order. A failure on one handle is recorded in the
/// report and does not prevent attempting the next.
pub async fn ingest_all<S, P>(
    store: &S,
    source: &P,
    handles: &[String],
    opts: &IngestOptions,
) -> IngestReport
where
    S: RecordStore + ?Sized,
    P: PostSource + ?Sized,
{
    let mut report = IngestReport::default();

    for handle in handles {
        let outcome = ingest_handle(store, source, handle, opts).await;
        if let Err(e) = &outcome {
            tracing::error!(handle = %handle, error = %e, "handle ingestion failed, continuing batch");
        }
        report.outcomes.push(HandleOutcome {
            handle: handle.clone(),
            outcome,
        });
    }

    tracing::info!(
        handles = handles.len(),
        failed = report.failed(),
        new_posts = report.total_new(),
        "ingestion batch finished"
    );
    report
}

/// The unique identifier for a raw post: the platform id when present,
/// otherwise a synthetic one derived deterministically from handle + content.
fn post_identity(username: &str, raw: &RawPost) -> String {
    match raw.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => synthetic_post_id(username, &raw.text),
    }
}

fn synthetic_post_id(username: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b"\n");
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(16);
    for byte in &digest[..8] {
        let _ = write!(hex, "{byte:02x}");
    }
    format!("{username}-{hex}")
}

/// Retries `op` across rate-limit responses, sleeping for the
/// source-specified interval clamped to the configured cap. All other
/// results pass straight through.
async fn bounded_rate_limit<T, F, Fut>(
    handle: &str,
    opts: &IngestOptions,
    mut op: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut waits = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(SourceError::RateLimited { retry_after_secs }) => {
                if waits >= opts.rate_limit_max_retries {
                    return Err(IngestError::RateLimitExhausted {
                        handle: handle.to_owned(),
                        retries: waits,
                    });
                }
                let wait_secs = retry_after_secs.clamp(1, opts.rate_limit_wait_cap_secs);
                tracing::warn!(handle, wait_secs, "rate limited, suspending this handle's ingestion");
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                waits += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
