//! Kiosk state machine: a menu of known handles and a rotating slideshow
//! of one handle's posts, driven by input events and a frame clock.

use std::sync::Arc;
use std::time::Duration;

use postkiosk_core::{post_url, Post, PostSource, RecordStore};
use postkiosk_ingest::{ingest_handle, IngestOptions};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::qr::{qr_for_url, QrArtifact};
use crate::scene::Scene;

/// Timing knobs for the engine. `dwell` is how long a post stays on screen
/// before auto-advancing, `fade` is the crossfade duration on transitions.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub dwell: Duration,
    pub fade: Duration,
    pub ingest: IngestOptions,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            dwell: Duration::from_secs(8),
            fade: Duration::from_millis(400),
            ingest: IngestOptions::default(),
        }
    }
}

/// User input, already decoded from whatever the frontend reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pick the handle at this menu position (0-based).
    Select(usize),
    Next,
    Prev,
    /// Leave the slideshow and return to the menu.
    Back,
    /// Re-ingest and reload whatever is currently shown.
    Refresh,
    Quit,
}

struct Slideshow {
    username: String,
    posts: Vec<Post>,
    index: usize,
    shown_at: Instant,
    fade_started: Option<Instant>,
    qr: QrArtifact,
}

enum EngineState {
    Menu {
        handles: Vec<String>,
        notice: Option<String>,
    },
    Slideshow(Slideshow),
    Stopped,
}

/// The kiosk engine. Owns no rendering; callers pull a [`Scene`] every frame
/// and hand it to a [`crate::Renderer`].
pub struct KioskEngine<S, P> {
    store: Arc<S>,
    source: Arc<P>,
    opts: DisplayOptions,
    state: EngineState,
}

impl<S, P> KioskEngine<S, P>
where
    S: RecordStore,
    P: PostSource,
{
    pub fn new(store: Arc<S>, source: Arc<P>, opts: DisplayOptions) -> Self {
        Self {
            store,
            source,
            opts,
            state: EngineState::Menu {
                handles: Vec::new(),
                notice: None,
            },
        }
    }

    /// Re-read the handle list from the store and show the menu. Store
    /// errors become a notice rather than tearing the engine down.
    pub async fn reload_menu(&mut self) {
        match self.store.list_handles().await {
            Ok(handles) => {
                let notice = if handles.is_empty() {
                    Some("No posts stored yet. Run a fetch or press r.".to_owned())
                } else {
                    None
                };
                self.state = EngineState::Menu { handles, notice };
            }
            Err(err) => {
                warn!(error = %err, "failed to list handles for menu");
                self.set_menu_notice(format!("Could not read handles: {err}"));
            }
        }
    }

    pub async fn handle_event(&mut self, event: InputEvent, now: Instant) {
        if matches!(self.state, EngineState::Stopped) {
            return;
        }
        match event {
            InputEvent::Quit => self.state = EngineState::Stopped,
            InputEvent::Select(position) => {
                let picked = if let EngineState::Menu { handles, .. } = &self.state {
                    handles.get(position).cloned()
                } else {
                    None
                };
                if let Some(username) = picked {
                    self.enter_slideshow(&username, now).await;
                }
            }
            InputEvent::Next => self.step(Direction::Forward, now),
            InputEvent::Prev => self.step(Direction::Backward, now),
            InputEvent::Back => {
                if matches!(self.state, EngineState::Slideshow(_)) {
                    self.reload_menu().await;
                }
            }
            InputEvent::Refresh => match &self.state {
                EngineState::Menu { .. } => self.reload_menu().await,
                EngineState::Slideshow(_) => self.refresh_current(now).await,
                EngineState::Stopped => {}
            },
        }
    }

    /// Advance the clock by one frame. Auto-advances the slideshow once the
    /// dwell time has elapsed and retires finished fades.
    pub fn on_frame(&mut self, now: Instant) {
        let dwell = self.opts.dwell;
        let fade = self.opts.fade;
        let advance = if let EngineState::Slideshow(show) = &mut self.state {
            if let Some(started) = show.fade_started {
                if now.saturating_duration_since(started) >= fade {
                    show.fade_started = None;
                }
            }
            !dwell.is_zero() && now.saturating_duration_since(show.shown_at) >= dwell
        } else {
            false
        };
        if advance {
            self.step(Direction::Forward, now);
        }
    }

    /// Snapshot of what should be on screen right now.
    pub fn scene(&self, now: Instant) -> Scene {
        match &self.state {
            EngineState::Menu { handles, notice } => Scene::Menu {
                handles: handles.clone(),
                notice: notice.clone(),
            },
            EngineState::Slideshow(show) => {
                let post = &show.posts[show.index];
                Scene::Slideshow {
                    username: show.username.clone(),
                    content: post.content.clone(),
                    created_at: post.created_at,
                    position: show.index + 1,
                    total: show.posts.len(),
                    qr: show.qr.clone(),
                    fade: self.fade_alpha(show, now),
                }
            }
            EngineState::Stopped => Scene::Blank,
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self.state, EngineState::Stopped)
    }

    fn fade_alpha(&self, show: &Slideshow, now: Instant) -> f32 {
        match show.fade_started {
            Some(started) if !self.opts.fade.is_zero() => {
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                (elapsed / self.opts.fade.as_secs_f32()).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    async fn enter_slideshow(&mut self, username: &str, now: Instant) {
        match self.store.list_posts_for_handle(username, true).await {
            Ok(posts) if posts.is_empty() => {
                self.set_menu_notice(format!("No posts stored for @{username}."));
            }
            Ok(posts) => {
                let qr = qr_for_post(&posts[0]);
                info!(username, count = posts.len(), "entering slideshow");
                self.state = EngineState::Slideshow(Slideshow {
                    username: username.to_owned(),
                    posts,
                    index: 0,
                    shown_at: now,
                    fade_started: Some(now),
                    qr,
                });
            }
            Err(err) => {
                warn!(username, error = %err, "failed to load posts");
                self.set_menu_notice(format!("Could not load posts for @{username}: {err}"));
            }
        }
    }

    fn step(&mut self, direction: Direction, now: Instant) {
        if let EngineState::Slideshow(show) = &mut self.state {
            let count = show.posts.len();
            if count == 0 {
                return;
            }
            show.index = match direction {
                Direction::Forward => (show.index + 1) % count,
                Direction::Backward => (show.index + count - 1) % count,
            };
            show.shown_at = now;
            show.fade_started = Some(now);
            show.qr = qr_for_post(&show.posts[show.index]);
        }
    }

    /// Re-ingest the current handle and reload its posts. Ingest failures
    /// keep the current list on screen; an emptied list falls back to the
    /// menu with a notice.
    async fn refresh_current(&mut self, now: Instant) {
        let username = match &self.state {
            EngineState::Slideshow(show) => show.username.clone(),
            _ => return,
        };
        if let Err(err) = ingest_handle(
            self.store.as_ref(),
            self.source.as_ref(),
            &username,
            &self.opts.ingest,
        )
        .await
        {
            warn!(username, error = %err, "refresh ingest failed, keeping current posts");
        }
        match self.store.list_posts_for_handle(&username, true).await {
            Ok(posts) if posts.is_empty() => {
                self.reload_menu().await;
                self.set_menu_notice(format!("No posts stored for @{username}."));
            }
            Ok(posts) => {
                if let EngineState::Slideshow(show) = &mut self.state {
                    show.index = show.index.min(posts.len() - 1);
                    show.posts = posts;
                    show.qr = qr_for_post(&show.posts[show.index]);
                    show.shown_at = now;
                    show.fade_started = None;
                }
            }
            Err(err) => {
                warn!(username, error = %err, "failed to reload posts after refresh");
            }
        }
    }

    fn set_menu_notice(&mut self, text: String) {
        match &mut self.state {
            EngineState::Menu { notice, .. } => *notice = Some(text),
            _ => {
                self.state = EngineState::Menu {
                    handles: Vec::new(),
                    notice: Some(text),
                };
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn qr_for_post(post: &Post) -> QrArtifact {
    let url = post_url(&post.username, &post.post_id);
    match qr_for_url(&url) {
        Ok(qr) => qr,
        Err(err) => {
            warn!(url, error = %err, "qr encoding failed");
            QrArtifact::empty()
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
