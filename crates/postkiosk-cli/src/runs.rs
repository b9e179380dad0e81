//! The `runs` command: recent `ingest_runs` ledger rows, newest first.

use sqlx::SqlitePool;

pub(crate) async fn run_runs(pool: &SqlitePool, limit: i64) -> anyhow::Result<()> {
    let rows = postkiosk_db::list_recent_ingest_runs(pool, limit).await?;
    if rows.is_empty() {
        println!("no ingest runs recorded");
        return Ok(());
    }

    for run in &rows {
        let when = run.created_at.format("%Y-%m-%d %H:%M:%S");
        match run.status.as_str() {
            "completed" => println!(
                "{when}  {:>9}  {:>4} posts  ({})",
                run.status, run.posts_stored, run.trigger_source
            ),
            "failed" => println!(
                "{when}  {:>9}  {}  ({})",
                run.status,
                run.error_message.as_deref().unwrap_or("unknown error"),
                run.trigger_source
            ),
            _ => println!("{when}  {:>9}  ({})", run.status, run.trigger_source),
        }
    }

    Ok(())
}
