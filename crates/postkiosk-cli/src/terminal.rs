//! A line-oriented terminal renderer. No cursor control, no blending: each
//! distinct scene is printed once, and the fade alpha is ignored.

use postkiosk_display::{QrArtifact, RenderError, Renderer, Scene};

pub(crate) struct TerminalRenderer {
    last_key: Option<String>,
}

impl TerminalRenderer {
    pub(crate) fn new() -> Self {
        Self { last_key: None }
    }

    /// Identity of a scene minus its fade alpha, so mid-fade frames do not
    /// reprint the same content.
    fn scene_key(scene: &Scene) -> String {
        match scene {
            Scene::Menu { handles, notice } => {
                format!(
                    "menu:{}:{}",
                    handles.join(","),
                    notice.as_deref().unwrap_or_default()
                )
            }
            Scene::Slideshow {
                username,
                position,
                total,
                ..
            } => format!("show:{username}:{position}:{total}"),
            Scene::Blank => "blank".to_owned(),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let key = Self::scene_key(scene);
        if self.last_key.as_ref() == Some(&key) {
            return Ok(());
        }
        self.last_key = Some(key);

        match scene {
            Scene::Menu { handles, notice } => {
                println!();
                println!("== postkiosk ==");
                if let Some(notice) = notice {
                    println!("! {notice}");
                }
                for (i, handle) in handles.iter().enumerate() {
                    println!("  [{}] @{handle}", i + 1);
                }
                if handles.is_empty() {
                    println!("r refresh, q quit");
                } else {
                    println!("pick 1-{}, r refresh, q quit", handles.len());
                }
            }
            Scene::Slideshow {
                username,
                content,
                created_at,
                position,
                total,
                qr,
                ..
            } => {
                println!();
                println!(
                    "@{username}  {}  ({position}/{total})",
                    created_at.format("%Y-%m-%d %H:%M")
                );
                println!("{content}");
                print_qr(qr);
                println!("n next, p prev, b back, r refresh, q quit");
            }
            Scene::Blank => {}
        }
        Ok(())
    }
}

/// Print a QR code using half-block characters, two modules per text row.
fn print_qr(qr: &QrArtifact) {
    let width = qr.width();
    if width == 0 {
        return;
    }
    let mut y = 0;
    while y < width {
        let mut line = String::with_capacity(width);
        for x in 0..width {
            line.push(match (qr.module(x, y), qr.module(x, y + 1)) {
                (true, true) => '\u{2588}',
                (true, false) => '\u{2580}',
                (false, true) => '\u{2584}',
                (false, false) => ' ',
            });
        }
        println!("{line}");
        y += 2;
    }
}
