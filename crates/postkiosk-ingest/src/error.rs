use postkiosk_core::{InvalidHandle, SourceError, StoreError};
use thiserror::Error;

/// Why an ingestion run for one handle failed.
///
/// Every variant is recoverable at the batch level: `ingest_all` logs the
/// failure and moves on to the next handle.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] InvalidHandle),

    #[error("handle @{handle} does not exist or is inaccessible")]
    HandleNotFound { handle: String },

    /// The source kept throttling past the bounded wait budget.
    #[error("gave up on @{handle} after {retries} rate-limit waits")]
    RateLimitExhausted { handle: String, retries: u32 },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
