//! The `show` command: dump one handle's stored posts to stdout.

use std::fmt::Write as _;

use postkiosk_core::{post_url, profile_url, Post, RecordStore};
use postkiosk_db::SqliteStore;
use sqlx::SqlitePool;

pub(crate) async fn run_show(pool: &SqlitePool, raw_handle: &str) -> anyhow::Result<()> {
    let username = postkiosk_core::normalize_handle(raw_handle)?;
    let store = SqliteStore::new(pool.clone());

    let posts = store.list_posts_for_handle(&username, true).await?;
    print!("{}", render_posts(&username, &posts));

    Ok(())
}

fn render_posts(username: &str, posts: &[Post]) -> String {
    let mut out = String::new();
    if posts.is_empty() {
        let _ = writeln!(out, "no stored posts for @{username}");
        return out;
    }

    let _ = writeln!(out, "@{username}  {}", profile_url(username));
    for post in posts {
        let _ = writeln!(
            out,
            "{}  {}",
            post.created_at.format("%Y-%m-%d %H:%M"),
            post.content
        );
        let _ = writeln!(out, "    {}", post_url(&post.username, &post.post_id));
    }
    let _ = writeln!(out, "{} posts for @{username}", posts.len());
    out
}
