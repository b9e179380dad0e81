pub mod app_config;
pub mod config;
pub mod handle;
pub mod handles;
pub mod source;
pub mod store;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, ConfigError};
pub use handle::{normalize_handle, post_url, profile_url, InvalidHandle};
pub use handles::{load_handles, HandlesFile};
pub use source::{PostSource, SourceError};
pub use store::{RecordStore, StoreError};
pub use types::{Handle, NewPost, Post, ProfileSnapshot, RawPost};
