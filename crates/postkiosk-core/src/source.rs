//! The post-source capability: whatever mechanism retrieves raw post data
//! for a handle.
//!
//! The core never sees protocol details — only a profile snapshot and an
//! ordered sequence of raw post items, bounded by the caller. Which concrete
//! backend implements this (token API, syndication endpoint, ...) is a
//! deployment decision.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ProfileSnapshot, RawPost};

#[derive(Debug, Error)]
pub enum SourceError {
    /// The handle does not exist or is inaccessible upstream.
    #[error("handle @{handle} not found at the post source")]
    NotFound { handle: String },

    /// The source asked us to back off. Distinct from a hard failure: the
    /// caller may wait `retry_after_secs` (bounded) and resume.
    #[error("rate limited by the post source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Transport-level failure (connection reset, timeout, TLS, ...).
    #[error("post source transport error: {message}")]
    Transport { message: String },

    /// The response body does not match the expected shape.
    #[error("post source returned malformed data for {context}: {message}")]
    Malformed { context: String, message: String },

    /// Any other non-success response.
    #[error("unexpected status {status} from post source at {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl SourceError {
    /// Transient conditions worth retrying after a backoff delay. NotFound
    /// and malformed responses would fail identically on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::RateLimited { .. } | SourceError::Transport { .. }
        )
    }
}

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the current profile snapshot for `handle`.
    async fn fetch_profile(&self, handle: &str) -> Result<ProfileSnapshot, SourceError>;

    /// Fetch up to `max_posts` raw post items for `handle`, in the order the
    /// source produces them. Implementations may return more than requested;
    /// callers discard the excess.
    async fn fetch_posts(&self, handle: &str, max_posts: usize)
        -> Result<Vec<RawPost>, SourceError>;
}
