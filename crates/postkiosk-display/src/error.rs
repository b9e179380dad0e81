use thiserror::Error;

/// A display/windowing/artifact failure.
///
/// Recovered per frame: the run loop logs it and keeps rendering. Only a
/// renderer that cannot be constructed at startup is fatal, and that is the
/// caller's decision.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("qr encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("render resource error: {0}")]
    Resource(String),
}
