//! Backoff retry for transient post-source errors.
//!
//! Rate limits (429) and network-level failures are retried with exponential
//! backoff; not-found and malformed responses are propagated immediately
//! since retrying would return the same result.

use std::future::Future;
use std::time::Duration;

use postkiosk_core::SourceError;

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a transient error ([`SourceError::is_transient`]), the function sleeps
/// and tries again, up to `max_retries` additional attempts after the first
/// try. A rate-limit response that carries its own `Retry-After` overrides
/// the computed backoff. If all retries are exhausted the last error is
/// returned.
///
/// The backoff before the n-th retry is `backoff_base_secs * 2^(n-1)`
/// seconds; with `max_retries = 3` the operation is attempted at most 4
/// times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        // base * 2^attempt seconds, capped to avoid shift overflow.
        let mut delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        if let SourceError::RateLimited { retry_after_secs } = &err {
            delay_secs = delay_secs.max(*retry_after_secs);
        }

        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient post-source error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
