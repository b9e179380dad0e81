//! HTTP implementation of the post-source capability.
//!
//! Talks to a read-only JSON facade: `GET /users/{handle}` for the profile
//! and `GET /users/{handle}/posts?limit=N[&cursor=C]` for the post listing.
//! Rate limiting (429), not-found (404), and other non-2xx responses map to
//! typed errors; transient failures are retried with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use postkiosk_core::{PostSource, ProfileSnapshot, RawPost, SourceError};
use reqwest::Client;

use crate::retry::retry_with_backoff;
use crate::types::{ApiPostPage, ApiProfile};

/// Maximum pages to walk per handle before giving up on the cursor chain.
/// Prevents infinite loops on a cycling cursor.
const MAX_PAGES: usize = 50;

/// Page size requested from the facade; the consumer truncates to its own cap.
const PAGE_LIMIT: usize = 100;

pub struct HttpPostSource {
    client: Client,
    base_url: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    backoff_base_secs: u64,
}

impl HttpPostSource {
    /// Creates a source with configured timeout, `User-Agent`, and retry
    /// policy. `max_retries = 0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    fn profile_endpoint(&self, handle: &str) -> String {
        format!("{}/users/{handle}", self.base_url)
    }

    fn posts_endpoint(&self, handle: &str, limit: usize, cursor: Option<&str>) -> String {
        match cursor {
            Some(c) => format!("{}/users/{handle}/posts?limit={limit}&cursor={c}", self.base_url),
            None => format!("{}/users/{handle}/posts?limit={limit}", self.base_url),
        }
    }

    /// Performs one GET and maps the status line to the error taxonomy.
    /// Returns the response body on 2xx.
    async fn get_body(&self, url: &str, handle: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30);
            return Err(SourceError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                handle: handle.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response.text().await.map_err(|e| SourceError::Transport {
            message: e.to_string(),
        })
    }

    async fn fetch_profile_once(&self, handle: &str) -> Result<ProfileSnapshot, SourceError> {
        let url = self.profile_endpoint(handle);
        let body = self.get_body(&url, handle).await?;

        let profile: ApiProfile =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
                context: format!("profile of @{handle}"),
                message: e.to_string(),
            })?;

        Ok(profile.into())
    }

    async fn fetch_page(
        &self,
        handle: &str,
        cursor: Option<&str>,
    ) -> Result<ApiPostPage, SourceError> {
        let url = self.posts_endpoint(handle, PAGE_LIMIT, cursor);
        let body = self.get_body(&url, handle).await?;

        serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
            context: format!("post page of @{handle}"),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_profile(&self, handle: &str) -> Result<ProfileSnapshot, SourceError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_profile_once(handle)
        })
        .await
    }

    async fn fetch_posts(
        &self,
        handle: &str,
        max_posts: usize,
    ) -> Result<Vec<RawPost>, SourceError> {
        let mut collected: Vec<RawPost> = Vec::new();
        let mut cursor: Option<String> = None;

        for page_no in 0..MAX_PAGES {
            let page = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
                self.fetch_page(handle, cursor.as_deref())
            })
            .await?;

            let page_len = page.posts.len();
            collected.extend(page.posts.into_iter().map(RawPost::from));

            if collected.len() >= max_posts {
                collected.truncate(max_posts);
                break;
            }

            match page.next_cursor {
                Some(next) if page_len > 0 => {
                    if page_no + 1 == MAX_PAGES {
                        tracing::warn!(
                            handle,
                            pages = MAX_PAGES,
                            "cursor chain did not terminate, stopping early"
                        );
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(collected)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
