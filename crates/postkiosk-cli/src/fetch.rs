//! The `fetch` command plus the helpers the `kiosk` command shares with it.
//!
//! Per-handle failures are logged and skipped rather than propagated, so one
//! bad handle does not abort the full run. The run is recorded as failed in
//! the ledger only when every handle failed.

use postkiosk_core::AppConfig;
use postkiosk_db::SqliteStore;
use postkiosk_ingest::{ingest_all, IngestOptions, IngestReport};
use postkiosk_source::HttpPostSource;
use sqlx::SqlitePool;

/// Resolve the handles to process: the `POSTKIOSK_HANDLES` list when set,
/// otherwise the handles file.
///
/// # Errors
///
/// Returns an error if the handles file cannot be read or parsed, or if no
/// handles are configured at all.
pub(crate) fn resolve_handles(config: &AppConfig) -> anyhow::Result<Vec<String>> {
    if !config.handles.is_empty() {
        return Ok(config.handles.clone());
    }
    let handles = postkiosk_core::load_handles(&config.handles_path)?;
    if handles.is_empty() {
        anyhow::bail!(
            "no handles configured; set POSTKIOSK_HANDLES or populate {}",
            config.handles_path.display()
        );
    }
    Ok(handles)
}

/// Build the HTTP post source from config.
///
/// # Errors
///
/// Returns an error if `POSTKIOSK_SOURCE_URL` is unset or the HTTP
/// client cannot be constructed.
pub(crate) fn build_source(config: &AppConfig) -> anyhow::Result<HttpPostSource> {
    let base_url = config
        .source_base_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("POSTKIOSK_SOURCE_URL is not set"))?;
    HttpPostSource::new(
        base_url,
        config.source_request_timeout_secs,
        &config.source_user_agent,
        config.source_max_retries,
        config.source_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build post source client: {e}"))
}

pub(crate) fn ingest_options(config: &AppConfig, max_posts: Option<usize>) -> IngestOptions {
    IngestOptions {
        max_posts: max_posts.unwrap_or(config.max_posts),
        rate_limit_max_retries: config.rate_limit_max_retries,
        rate_limit_wait_cap_secs: config.rate_limit_wait_cap_secs,
    }
}

/// Close out a ledger row from a batch report. The run counts as failed
/// only when no handle succeeded.
pub(crate) async fn record_run(
    pool: &SqlitePool,
    run_id: i64,
    report: &IngestReport,
) -> anyhow::Result<()> {
    let failed = report.failed();
    if failed > 0 && failed == report.outcomes.len() {
        let message = report
            .outcomes
            .iter()
            .filter_map(|o| {
                o.outcome
                    .as_ref()
                    .err()
                    .map(|e| format!("@{}: {e}", o.handle))
            })
            .collect::<Vec<_>>()
            .join("; ");
        postkiosk_db::fail_ingest_run(pool, run_id, &message).await?;
    } else {
        let stored = i64::try_from(report.total_new()).unwrap_or(i64::MAX);
        postkiosk_db::complete_ingest_run(pool, run_id, stored).await?;
    }
    Ok(())
}

/// Fetch and store posts for the configured handles (or a single one),
/// recording the batch in the `ingest_runs` ledger.
///
/// # Errors
///
/// Returns an error if config resolution, the source client, or the ledger
/// bookkeeping fails. Per-handle ingest failures are reported but do not
/// fail the command.
pub(crate) async fn run_fetch(
    pool: &SqlitePool,
    config: &AppConfig,
    handle_filter: Option<&str>,
    max_posts: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let handles = match handle_filter {
        Some(raw) => vec![postkiosk_core::normalize_handle(raw)?],
        None => resolve_handles(config)?,
    };
    let opts = ingest_options(config, max_posts);

    if dry_run {
        println!(
            "dry-run: would fetch up to {} posts each for [{}]",
            opts.max_posts,
            handles.join(", ")
        );
        return Ok(());
    }

    let source = build_source(config)?;
    let store = SqliteStore::new(pool.clone());

    let run = postkiosk_db::create_ingest_run(pool, "cli").await?;
    postkiosk_db::start_ingest_run(pool, run.id).await?;

    let report = ingest_all(&store, &source, &handles, &opts).await;
    record_run(pool, run.id, &report).await?;

    for outcome in &report.outcomes {
        match &outcome.outcome {
            Ok(stored) => println!("@{}: {stored} new posts", outcome.handle),
            Err(e) => eprintln!("error: @{}: {e}", outcome.handle),
        }
    }
    println!(
        "stored {} new posts across {} handles ({} failed)",
        report.total_new(),
        report.outcomes.len(),
        report.failed()
    );

    Ok(())
}
