//! SQLite-backed implementation of the record-store capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postkiosk_core::{Handle, NewPost, Post, ProfileSnapshot, RecordStore, StoreError};
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `handles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct HandleRow {
    id: i64,
    handle_id: String,
    username: String,
    display_name: Option<String>,
    bio: Option<String>,
    followers_count: Option<i64>,
    following_count: Option<i64>,
    posts_count: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HandleRow> for Handle {
    fn from(row: HandleRow) -> Self {
        Handle {
            id: row.id,
            handle_id: row.handle_id,
            username: row.username,
            display_name: row.display_name,
            bio: row.bio,
            followers_count: row.followers_count,
            following_count: row.following_count,
            posts_count: row.posts_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: i64,
    post_id: String,
    username: String,
    content: String,
    created_at: DateTime<Utc>,
    likes_count: Option<i64>,
    reposts_count: Option<i64>,
    inserted_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            post_id: row.post_id,
            username: row.username,
            content: row.content,
            created_at: row.created_at,
            likes_count: row.likes_count,
            reposts_count: row.reposts_count,
            inserted_at: row.inserted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The record store over a SQLite pool. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for callers that need ledger operations outside
    /// the [`RecordStore`] contract.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upserts a handle keyed on its stable identifier.
    ///
    /// Conflicts update mutable profile fields in place. Metric and profile
    /// fields the new snapshot does not carry are preserved via `COALESCE`,
    /// so repeated calls with stale or partial data never erase known values.
    async fn upsert_handle_row(&self, profile: &ProfileSnapshot) -> Result<HandleRow, DbError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, HandleRow>(
            "INSERT INTO handles \
                 (handle_id, username, display_name, bio, \
                  followers_count, following_count, posts_count, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (handle_id) DO UPDATE SET \
                 username        = excluded.username, \
                 display_name    = COALESCE(excluded.display_name, handles.display_name), \
                 bio             = COALESCE(excluded.bio, handles.bio), \
                 followers_count = COALESCE(excluded.followers_count, handles.followers_count), \
                 following_count = COALESCE(excluded.following_count, handles.following_count), \
                 posts_count     = COALESCE(excluded.posts_count, handles.posts_count), \
                 updated_at      = excluded.updated_at \
             RETURNING id, handle_id, username, display_name, bio, \
                       followers_count, following_count, posts_count, created_at, updated_at",
        )
        .bind(profile.stable_id())
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(profile.followers_count)
        .bind(profile.following_count)
        .bind(profile.posts_count)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Inserts the post and its seen-post ledger entry in one transaction.
    ///
    /// Identifier collisions are absorbed by `ON CONFLICT DO NOTHING` and
    /// reported as `Ok(false)`; they never surface as uniqueness violations.
    async fn insert_post_if_new_tx(&self, post: &NewPost) -> Result<bool, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO posts \
                 (post_id, username, content, created_at, likes_count, reposts_count, inserted_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (post_id) DO NOTHING",
        )
        .bind(&post.post_id)
        .bind(&post.username)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.likes_count)
        .bind(post.reposts_count)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO seen_posts (post_id, seen_at) VALUES (?, ?) \
             ON CONFLICT (post_id) DO NOTHING",
        )
        .bind(&post.post_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn post_exists_query(&self, post_id: &str) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM seen_posts WHERE post_id = ?) \
                 OR EXISTS (SELECT 1 FROM posts WHERE post_id = ?)",
        )
        .bind(post_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_handles_query(&self) -> Result<Vec<String>, DbError> {
        let handles = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT username FROM posts ORDER BY username ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(handles)
    }

    async fn list_posts_query(
        &self,
        username: &str,
        newest_first: bool,
    ) -> Result<Vec<PostRow>, DbError> {
        let sql = if newest_first {
            "SELECT id, post_id, username, content, created_at, likes_count, reposts_count, inserted_at \
             FROM posts WHERE username = ? ORDER BY created_at DESC"
        } else {
            "SELECT id, post_id, username, content, created_at, likes_count, reposts_count, inserted_at \
             FROM posts WHERE username = ? ORDER BY created_at ASC"
        };

        let rows = sqlx::query_as::<_, PostRow>(sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert_handle(&self, profile: &ProfileSnapshot) -> Result<Handle, StoreError> {
        let row = self.upsert_handle_row(profile).await?;
        Ok(row.into())
    }

    async fn post_exists(&self, post_id: &str) -> Result<bool, StoreError> {
        Ok(self.post_exists_query(post_id).await?)
    }

    async fn insert_post_if_new(&self, post: &NewPost) -> Result<bool, StoreError> {
        Ok(self.insert_post_if_new_tx(post).await?)
    }

    async fn list_handles(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.list_handles_query().await?)
    }

    async fn list_posts_for_handle(
        &self,
        username: &str,
        newest_first: bool,
    ) -> Result<Vec<Post>, StoreError> {
        let rows = self.list_posts_query(username, newest_first).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
