//! QR artifact generation.
//!
//! The engine hands renderers a square module matrix rather than pixels;
//! how big each module is drawn is the renderer's business.

use qrcode::{Color, QrCode};

use crate::error::RenderError;

/// A rendered QR code as a square matrix of dark/light modules,
/// deterministic for a given input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    width: usize,
    modules: Vec<bool>,
}

impl QrArtifact {
    /// A zero-module placeholder, used when encoding fails so rendering can
    /// continue without the artifact.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            width: 0,
            modules: Vec::new(),
        }
    }

    /// Side length in modules.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at `(x, y)` is dark. Out-of-range coordinates
    /// read as light.
    #[must_use]
    pub fn module(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }
}

/// Encode `url` as a QR artifact.
///
/// # Errors
///
/// Returns [`RenderError::Qr`] if the payload exceeds QR capacity.
pub fn qr_for_url(url: &str) -> Result<QrArtifact, RenderError> {
    let code = QrCode::new(url.as_bytes())?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    Ok(QrArtifact { width, modules })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_is_square() {
        let qr = qr_for_url("https://twitter.com/BCCI/status/123").unwrap();
        assert!(qr.width() >= 21, "smallest QR version is 21 modules");

        // Every module is addressable; the corner finder pattern is dark.
        assert!(qr.module(0, 0));
    }

    #[test]
    fn same_url_same_artifact() {
        let a = qr_for_url("https://twitter.com/ICC/status/42").unwrap();
        let b = qr_for_url("https://twitter.com/ICC/status/42").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_urls_differ() {
        let a = qr_for_url("https://twitter.com/ICC/status/42").unwrap();
        let b = qr_for_url("https://twitter.com/ICC/status/43").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn out_of_range_module_reads_light() {
        let qr = qr_for_url("https://twitter.com/ICC").unwrap();
        assert!(!qr.module(10_000, 0));
    }
}
