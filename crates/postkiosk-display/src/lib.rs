pub mod engine;
pub mod error;
pub mod qr;
pub mod run;
pub mod scene;

pub use engine::{DisplayOptions, InputEvent, KioskEngine};
pub use error::RenderError;
pub use qr::{qr_for_url, QrArtifact};
pub use run::run;
pub use scene::{Renderer, Scene};
