use std::path::PathBuf;

/// Process-wide configuration, read once at startup and treated as a
/// read-only input bundle from then on.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Base URL of the post-source API. Commands that never talk to the
    /// source (`show`, `runs`) work without it.
    pub source_base_url: Option<String>,
    /// Tracked handles from `POSTKIOSK_HANDLES`; when empty the handles
    /// file at `handles_path` is consulted instead.
    pub handles: Vec<String>,
    pub handles_path: PathBuf,
    pub log_level: String,

    pub max_posts: usize,
    pub refresh_interval_secs: u64,

    pub dwell_secs: u64,
    pub fade_ms: u64,
    pub frame_rate: u32,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub source_request_timeout_secs: u64,
    pub source_user_agent: String,
    pub source_max_retries: u32,
    pub source_backoff_base_secs: u64,

    pub rate_limit_max_retries: u32,
    pub rate_limit_wait_cap_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("source_base_url", &self.source_base_url)
            .field("handles", &self.handles)
            .field("handles_path", &self.handles_path)
            .field("log_level", &self.log_level)
            .field("max_posts", &self.max_posts)
            .field("refresh_interval_secs", &self.refresh_interval_secs)
            .field("dwell_secs", &self.dwell_secs)
            .field("fade_ms", &self.fade_ms)
            .field("frame_rate", &self.frame_rate)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "source_request_timeout_secs",
                &self.source_request_timeout_secs,
            )
            .field("source_user_agent", &self.source_user_agent)
            .field("source_max_retries", &self.source_max_retries)
            .field("source_backoff_base_secs", &self.source_backoff_base_secs)
            .field("rate_limit_max_retries", &self.rate_limit_max_retries)
            .field("rate_limit_wait_cap_secs", &self.rate_limit_wait_cap_secs)
            .finish()
    }
}
