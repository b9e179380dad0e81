//! Frame/input loop gluing a [`KioskEngine`] to a [`Renderer`].

use std::time::Duration;

use postkiosk_core::{PostSource, RecordStore};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::engine::{InputEvent, KioskEngine};
use crate::scene::{Renderer, Scene};

/// Drive the engine until it stops: input events are applied as they
/// arrive, the frame ticker advances dwell and fade timers, and the scene
/// is re-rendered whenever it changes. A closed input channel counts as
/// quit. Render failures are logged and the loop keeps going.
pub async fn run<S, P, R>(
    mut engine: KioskEngine<S, P>,
    mut renderer: R,
    mut input: mpsc::Receiver<InputEvent>,
    frame_rate: u32,
) where
    S: RecordStore,
    P: PostSource,
    R: Renderer,
{
    engine.reload_menu().await;

    let frame = Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)));
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_scene: Option<Scene> = None;
    loop {
        tokio::select! {
            received = input.recv() => {
                let event = received.unwrap_or(InputEvent::Quit);
                engine.handle_event(event, Instant::now()).await;
            }
            _ = ticker.tick() => {
                engine.on_frame(Instant::now());
            }
        }
        if engine.is_stopped() {
            info!("display loop stopped");
            break;
        }
        let scene = engine.scene(Instant::now());
        if last_scene.as_ref() != Some(&scene) {
            if let Err(err) = renderer.render(&scene) {
                warn!(error = %err, "frame render failed");
            }
            last_scene = Some(scene);
        }
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod run_test;
