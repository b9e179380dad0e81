//! What the engine wants drawn, decoupled from how it is drawn.

use chrono::{DateTime, Utc};

use crate::error::RenderError;
use crate::qr::QrArtifact;

/// One frame's worth of display state.
///
/// `Slideshow::fade` ramps 0.0 -> 1.0 over the transition window after an
/// advance; renderers that cannot blend simply ignore it.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Menu {
        handles: Vec<String>,
        notice: Option<String>,
    },
    Slideshow {
        username: String,
        content: String,
        created_at: DateTime<Utc>,
        /// 1-based position of the current post.
        position: usize,
        total: usize,
        qr: QrArtifact,
        fade: f32,
    },
    Blank,
}

/// The drawing seam. Implementations own the actual surface, whether that
/// is a window, a terminal, or a recording buffer in tests.
pub trait Renderer {
    /// Draw one scene. Failures are recovered per frame by the run loop.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the surface rejects the frame.
    fn render(&mut self, scene: &Scene) -> Result<(), RenderError>;
}
