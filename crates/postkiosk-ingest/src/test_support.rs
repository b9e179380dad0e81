//! In-memory store and source doubles shared by the pipeline and scheduler
//! tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use postkiosk_core::{
    Handle, NewPost, Post, PostSource, ProfileSnapshot, RawPost, RecordStore, SourceError,
    StoreError,
};

#[derive(Default)]
pub(crate) struct MockStore {
    pub state: Mutex<MockStoreState>,
    /// 1-based insert attempts that should fail with a storage error.
    pub fail_insert_attempts: Mutex<HashSet<u64>>,
    insert_attempts: AtomicU64,
}

#[derive(Default)]
pub(crate) struct MockStoreState {
    pub handles: HashMap<String, Handle>,
    pub posts: Vec<Post>,
    pub seen: BTreeSet<String>,
}

impl MockStore {
    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn seen_count(&self) -> usize {
        self.state.lock().unwrap().seen.len()
    }

    pub fn fail_on_attempts(&self, attempts: &[u64]) {
        let mut fail = self.fail_insert_attempts.lock().unwrap();
        fail.extend(attempts.iter().copied());
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn upsert_handle(&self, profile: &ProfileSnapshot) -> Result<Handle, StoreError> {
        let mut state = self.state.lock().unwrap();
        let next_id = i64::try_from(state.handles.len()).unwrap_or(0) + 1;
        let now = Utc::now();
        let handle = state
            .handles
            .entry(profile.username.clone())
            .or_insert_with(|| Handle {
                id: next_id,
                handle_id: profile.stable_id().to_owned(),
                username: profile.username.clone(),
                display_name: None,
                bio: None,
                followers_count: None,
                following_count: None,
                posts_count: None,
                created_at: now,
                updated_at: now,
            });
        handle.updated_at = now;
        Ok(handle.clone())
    }

    async fn post_exists(&self, post_id: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().seen.contains(post_id))
    }

    async fn insert_post_if_new(&self, post: &NewPost) -> Result<bool, StoreError> {
        let attempt = self.insert_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_insert_attempts.lock().unwrap().contains(&attempt) {
            return Err(StoreError(format!("injected failure on attempt {attempt}")));
        }

        let mut state = self.state.lock().unwrap();
        if state.seen.contains(&post.post_id) {
            return Ok(false);
        }
        let id = i64::try_from(state.posts.len()).unwrap_or(0) + 1;
        state.posts.push(Post {
            id,
            post_id: post.post_id.clone(),
            username: post.username.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            likes_count: post.likes_count,
            reposts_count: post.reposts_count,
            inserted_at: Utc::now(),
        });
        state.seen.insert(post.post_id.clone());
        Ok(true)
    }

    async fn list_handles(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().unwrap();
        let distinct: BTreeSet<String> = state.posts.iter().map(|p| p.username.clone()).collect();
        Ok(distinct.into_iter().collect())
    }

    async fn list_posts_for_handle(
        &self,
        username: &str,
        newest_first: bool,
    ) -> Result<Vec<Post>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| p.username == username)
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.created_at);
        if newest_first {
            posts.reverse();
        }
        Ok(posts)
    }
}

#[derive(Default)]
pub(crate) struct MockSource {
    pub posts: Mutex<HashMap<String, Vec<RawPost>>>,
    pub missing: Mutex<HashSet<String>>,
    /// Number of `RateLimited` responses still to emit before succeeding.
    pub rate_limit_budget: AtomicU32,
    pub profile_calls: AtomicU32,
    pub posts_calls: AtomicU32,
}

impl MockSource {
    pub fn with_posts(handle: &str, posts: Vec<RawPost>) -> Self {
        let source = Self::default();
        source.posts.lock().unwrap().insert(handle.to_owned(), posts);
        source
    }

    pub fn mark_missing(&self, handle: &str) {
        self.missing.lock().unwrap().insert(handle.to_owned());
    }
}

#[async_trait]
impl PostSource for MockSource {
    async fn fetch_profile(&self, handle: &str) -> Result<ProfileSnapshot, SourceError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);

        if self.missing.lock().unwrap().contains(handle) {
            return Err(SourceError::NotFound {
                handle: handle.to_owned(),
            });
        }
        if self
            .rate_limit_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SourceError::RateLimited {
                retry_after_secs: 5,
            });
        }
        Ok(ProfileSnapshot::bare(handle))
    }

    async fn fetch_posts(
        &self,
        handle: &str,
        _max_posts: usize,
    ) -> Result<Vec<RawPost>, SourceError> {
        self.posts_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .posts
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .unwrap_or_default())
    }
}

/// A raw post with a platform id, created `offset_secs` from now.
pub(crate) fn raw_post(id: &str, text: &str, offset_secs: i64) -> RawPost {
    RawPost {
        id: Some(id.to_owned()),
        text: text.to_owned(),
        created_at: Some(Utc::now() + Duration::seconds(offset_secs)),
        likes_count: None,
        reposts_count: None,
    }
}

/// A raw post with no platform id; the pipeline derives a synthetic one.
pub(crate) fn anonymous_post(text: &str) -> RawPost {
    RawPost {
        id: None,
        text: text.to_owned(),
        created_at: None,
        likes_count: None,
        reposts_count: None,
    }
}
