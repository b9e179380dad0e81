//! The `kiosk` command: initial ingest, background refresh scheduler, and
//! the interactive terminal display loop.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use postkiosk_core::AppConfig;
use postkiosk_db::SqliteStore;
use postkiosk_display::{DisplayOptions, InputEvent, KioskEngine};
use postkiosk_ingest::{ingest_all, RefreshHandle, RefreshScheduler};
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tracing::info;

use crate::fetch::{build_source, ingest_options, record_run, resolve_handles};
use crate::terminal::TerminalRenderer;

pub(crate) async fn run_kiosk(pool: SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    let handles = resolve_handles(config)?;
    let source = Arc::new(build_source(config)?);
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let opts = ingest_options(config, None);

    // Initial fill so the menu has content on first paint.
    info!(handles = handles.len(), "running startup ingest");
    let run = postkiosk_db::create_ingest_run(&pool, "kiosk-startup").await?;
    postkiosk_db::start_ingest_run(&pool, run.id).await?;
    let report = ingest_all(store.as_ref(), source.as_ref(), &handles, &opts).await;
    record_run(&pool, run.id, &report).await?;

    let scheduler = RefreshScheduler::new(
        Arc::clone(&store),
        Arc::clone(&source),
        handles,
        Duration::from_secs(config.refresh_interval_secs),
        opts,
    );
    let (refresh, scheduler_task) = scheduler.spawn();

    let (input_tx, input_rx) = mpsc::channel(16);
    spawn_input_reader(input_tx, refresh.clone());

    let engine = KioskEngine::new(store, source, DisplayOptions {
        dwell: Duration::from_secs(config.dwell_secs),
        fade: Duration::from_millis(config.fade_ms),
        ingest: opts,
    });
    postkiosk_display::run(engine, TerminalRenderer::new(), input_rx, config.frame_rate).await;

    // Dropping the last refresh handle stops the scheduler task.
    drop(refresh);
    scheduler_task.await.ok();

    Ok(())
}

/// Read line-based commands from stdin on a blocking thread and forward
/// them to the display loop. A refresh command also pokes the scheduler so
/// the full batch runs now and the periodic timer resets.
fn spawn_input_reader(tx: mpsc::Sender<InputEvent>, refresh: RefreshHandle) {
    let (raw_tx, raw_rx) = mpsc::channel::<InputEvent>(16);

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(event) = parse_input(line.trim()) else {
                continue;
            };
            if raw_tx.blocking_send(event).is_err() {
                break;
            }
        }
        // Dropping raw_tx closes the chain, which quits the display loop.
    });

    tokio::spawn(forward_input(raw_rx, tx, refresh));
}

/// Forward raw input events to the display loop. Returns as soon as the
/// display side hangs up, even while the stdin thread is still blocked on a
/// read, so the captured [`RefreshHandle`] drops and the scheduler can stop.
async fn forward_input(
    mut raw_rx: mpsc::Receiver<InputEvent>,
    tx: mpsc::Sender<InputEvent>,
    refresh: RefreshHandle,
) {
    loop {
        tokio::select! {
            event = raw_rx.recv() => {
                let Some(event) = event else { break };
                if matches!(event, InputEvent::Refresh) {
                    refresh.trigger().await;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            () = tx.closed() => break,
        }
    }
}

fn parse_input(token: &str) -> Option<InputEvent> {
    match token {
        "q" | "quit" => Some(InputEvent::Quit),
        // An empty line advances, same as `n`.
        "n" | "" => Some(InputEvent::Next),
        "p" => Some(InputEvent::Prev),
        "b" => Some(InputEvent::Back),
        "r" => Some(InputEvent::Refresh),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| InputEvent::Select(n - 1)),
    }
}

#[cfg(test)]
mod forward_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use postkiosk_core::{
        Handle, NewPost, Post, PostSource, ProfileSnapshot, RawPost, RecordStore, SourceError,
        StoreError,
    };
    use postkiosk_display::InputEvent;
    use postkiosk_ingest::{IngestOptions, RefreshScheduler};
    use tokio::sync::mpsc;

    use super::forward_input;

    struct NullStore;

    #[async_trait]
    impl RecordStore for NullStore {
        async fn upsert_handle(&self, _profile: &ProfileSnapshot) -> Result<Handle, StoreError> {
            Err(StoreError("no storage".to_owned()))
        }

        async fn post_exists(&self, _post_id: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert_post_if_new(&self, _post: &NewPost) -> Result<bool, StoreError> {
            Err(StoreError("no storage".to_owned()))
        }

        async fn list_handles(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }

        async fn list_posts_for_handle(
            &self,
            _username: &str,
            _newest_first: bool,
        ) -> Result<Vec<Post>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct NullSource;

    #[async_trait]
    impl PostSource for NullSource {
        async fn fetch_profile(&self, handle: &str) -> Result<ProfileSnapshot, SourceError> {
            Err(SourceError::NotFound {
                handle: handle.to_owned(),
            })
        }

        async fn fetch_posts(
            &self,
            handle: &str,
            _max_posts: usize,
        ) -> Result<Vec<RawPost>, SourceError> {
            Err(SourceError::NotFound {
                handle: handle.to_owned(),
            })
        }
    }

    // The forwarder must release its refresh handle once the display loop is
    // gone, even while the raw input channel stays open (the stdin thread
    // blocks on a read until the process exits). Otherwise the scheduler's
    // channel never closes and the kiosk hangs after quit.
    #[tokio::test]
    async fn scheduler_stops_after_display_loop_ends() {
        let scheduler = RefreshScheduler::new(
            Arc::new(NullStore),
            Arc::new(NullSource),
            vec!["example".to_owned()],
            Duration::from_secs(3600),
            IngestOptions::default(),
        );
        let (refresh, scheduler_task) = scheduler.spawn();

        let (raw_tx, raw_rx) = mpsc::channel::<InputEvent>(16);
        let (input_tx, input_rx) = mpsc::channel::<InputEvent>(16);
        let forwarder = tokio::spawn(forward_input(raw_rx, input_tx, refresh.clone()));

        // The display loop ending drops its receiver.
        drop(input_rx);
        drop(refresh);

        tokio::time::timeout(Duration::from_secs(1), forwarder)
            .await
            .expect("forwarder should exit when the display loop ends")
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), scheduler_task)
            .await
            .expect("scheduler should stop once every refresh handle is gone")
            .unwrap();

        drop(raw_tx);
    }
}
