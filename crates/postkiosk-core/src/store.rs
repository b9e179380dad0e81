//! The record-store capability consumed by the ingestion pipeline and the
//! display engine.
//!
//! The store exclusively owns all persisted state; callers hold no copies
//! beyond transient working sets. Each operation is atomic: it either fully
//! applies or fully rolls back, which is the only synchronization primitive
//! concurrent writers need.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Handle, NewPost, Post, ProfileSnapshot};

/// A persistence failure, opaque to callers.
///
/// Scoped per call: the pipeline logs it, skips the affected record, and
/// continues — a single bad record never aborts a full ingestion run.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert the handle described by `profile`, or update its mutable fields
    /// in place when a row with the same stable identifier already exists.
    /// Safe to call repeatedly with stale data.
    async fn upsert_handle(&self, profile: &ProfileSnapshot) -> Result<Handle, StoreError>;

    /// Whether `post_id` has already been processed, by indexed lookup
    /// against the seen-post ledger (falling back to the posts table).
    async fn post_exists(&self, post_id: &str) -> Result<bool, StoreError>;

    /// Insert the post and its matching seen-post ledger entry in one
    /// transaction. Returns `false` (not an error) on identifier collision.
    async fn insert_post_if_new(&self, post: &NewPost) -> Result<bool, StoreError>;

    /// Distinct usernames with at least one stored post, ordered ascending
    /// for deterministic menu rendering.
    async fn list_handles(&self) -> Result<Vec<String>, StoreError>;

    /// All stored posts for `username`, ordered by creation time.
    async fn list_posts_for_handle(
        &self,
        username: &str,
        newest_first: bool,
    ) -> Result<Vec<Post>, StoreError>;
}
