//! Background refresh scheduler.
//!
//! One task, two triggers: a fixed periodic interval and a manual signal
//! from the display engine. Both run the same full ingestion batch; a
//! manual trigger resets the periodic reference point, so the next
//! periodic batch is one full interval after the manual one. The scheduler
//! and the foreground render loop share nothing but the record store.

use std::sync::Arc;
use std::time::Duration;

use postkiosk_core::{PostSource, RecordStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::pipeline::{ingest_all, IngestOptions};

/// Handle for requesting an immediate refresh. Dropping every handle stops
/// the scheduler task promptly.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Request an immediate full refresh. Returns `false` if the scheduler
    /// task has already stopped.
    pub async fn trigger(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

pub struct RefreshScheduler<S, P> {
    store: Arc<S>,
    source: Arc<P>,
    handles: Vec<String>,
    interval: Duration,
    opts: IngestOptions,
}

impl<S, P> RefreshScheduler<S, P>
where
    S: RecordStore + 'static,
    P: PostSource + 'static,
{
    #[must_use]
    pub fn new(
        store: Arc<S>,
        source: Arc<P>,
        handles: Vec<String>,
        interval: Duration,
        opts: IngestOptions,
    ) -> Self {
        Self {
            store,
            source,
            handles,
            interval,
            opts,
        }
    }

    /// Start the background task. The returned [`RefreshHandle`] is the only
    /// way to talk to it; the [`JoinHandle`] resolves once the task stops.
    #[must_use]
    pub fn spawn(self) -> (RefreshHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1);
        let join = tokio::spawn(self.run(rx));
        (RefreshHandle { tx }, join)
    }

    async fn run(self, mut rx: mpsc::Receiver<()>) {
        let mut next_tick = Instant::now() + self.interval;
        let mut last_refresh: Option<Instant> = None;

        loop {
            tokio::select! {
                () = tokio::time::sleep_until(next_tick) => {
                    self.run_batch("periodic", last_refresh).await;
                    last_refresh = Some(Instant::now());
                    next_tick = Instant::now() + self.interval;
                }
                msg = rx.recv() => match msg {
                    Some(()) => {
                        self.run_batch("manual", last_refresh).await;
                        last_refresh = Some(Instant::now());
                        next_tick = Instant::now() + self.interval;
                    }
                    None => break,
                },
            }
        }

        tracing::info!("refresh scheduler stopped");
    }

    /// One full batch. Any failure is logged and absorbed so the timer loop
    /// keeps running.
    async fn run_batch(&self, trigger: &str, last_refresh: Option<Instant>) {
        let since_secs = last_refresh.map(|t| t.elapsed().as_secs());
        tracing::info!(trigger, since_last_refresh_secs = since_secs, "starting refresh batch");

        let report = ingest_all(
            self.store.as_ref(),
            self.source.as_ref(),
            &self.handles,
            &self.opts,
        )
        .await;

        tracing::info!(
            trigger,
            new_posts = report.total_new(),
            failed_handles = report.failed(),
            "refresh batch finished"
        );
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
