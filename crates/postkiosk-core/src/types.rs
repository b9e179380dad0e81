//! Domain record types shared across the workspace.
//!
//! These are the canonical shapes: one `Handle` per tracked account, one
//! `Post` per unique post identifier, plus the snapshot/raw forms produced
//! by a post source before they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked account as stored in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub id: i64,
    /// Platform-assigned stable identifier. Falls back to the username when
    /// the source cannot supply one; unique either way.
    pub handle_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile as fetched from the post source, before persistence.
///
/// All metric fields are optional: a source that cannot see them leaves them
/// `None`, and the store preserves any previously known values on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub handle_id: Option<String>,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
}

impl ProfileSnapshot {
    /// Snapshot carrying nothing but the username. Used when the source can
    /// resolve a handle but exposes no profile metadata.
    #[must_use]
    pub fn bare(username: &str) -> Self {
        Self {
            handle_id: None,
            username: username.to_owned(),
            display_name: None,
            bio: None,
            followers_count: None,
            following_count: None,
            posts_count: None,
        }
    }

    /// The stable identifier to key the handle row on: the platform id when
    /// known, otherwise the username itself.
    #[must_use]
    pub fn stable_id(&self) -> &str {
        self.handle_id.as_deref().unwrap_or(&self.username)
    }
}

/// A raw post item as produced by the post source.
///
/// `id` is the platform-assigned identifier when the source exposes one; the
/// ingestion pipeline derives a synthetic identifier from handle + content
/// when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: Option<String>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub likes_count: Option<i64>,
    pub reposts_count: Option<i64>,
}

/// A post ready to be inserted, with its unique identifier resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub post_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: Option<i64>,
    pub reposts_count: Option<i64>,
}

/// A stored post as read back from the record store. Immutable after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub post_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: Option<i64>,
    pub reposts_count: Option<i64>,
    pub inserted_at: DateTime<Utc>,
}
