//! Wire types for the post-source JSON API.
//!
//! The upstream is a read-only JSON facade over one social platform. Two
//! endpoints are consumed: a profile document and a paged post listing.
//! Everything beyond `username` and `text` is optional — older mirrors of
//! the facade omit engagement metrics and sometimes post ids entirely, in
//! which case the ingestion pipeline derives a synthetic identifier.

use chrono::{DateTime, Utc};
use postkiosk_core::{ProfileSnapshot, RawPost};
use serde::Deserialize;

/// Response from `GET /users/{handle}`.
#[derive(Debug, Deserialize)]
pub struct ApiProfile {
    /// Platform-assigned account id, as a string. Absent on some mirrors.
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers_count: Option<i64>,
    #[serde(default)]
    pub following_count: Option<i64>,
    #[serde(default)]
    pub posts_count: Option<i64>,
}

impl From<ApiProfile> for ProfileSnapshot {
    fn from(api: ApiProfile) -> Self {
        ProfileSnapshot {
            handle_id: api.id,
            username: api.username,
            display_name: api.display_name,
            bio: api.bio,
            followers_count: api.followers_count,
            following_count: api.following_count,
            posts_count: api.posts_count,
        }
    }
}

/// One page from `GET /users/{handle}/posts`.
#[derive(Debug, Deserialize)]
pub struct ApiPostPage {
    pub posts: Vec<ApiPost>,
    /// Opaque cursor for the next page; `null` or absent on the last page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A single post item within a page.
#[derive(Debug, Deserialize)]
pub struct ApiPost {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes_count: Option<i64>,
    #[serde(default)]
    pub reposts_count: Option<i64>,
}

impl From<ApiPost> for RawPost {
    fn from(api: ApiPost) -> Self {
        RawPost {
            id: api.id,
            text: api.text,
            created_at: api.created_at,
            likes_count: api.likes_count,
            reposts_count: api.reposts_count,
        }
    }
}
