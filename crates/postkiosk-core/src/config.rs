use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read handles file {path}: {source}")]
    HandlesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse handles file: {0}")]
    HandlesFileParse(#[from] serde_yaml::Error),
    #[error("handles file entry rejected: {0}")]
    HandlesFileEntry(#[from] crate::handle::InvalidHandle),
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any set env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so tests can drive it with
/// a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = or_default("DATABASE_URL", "sqlite:postkiosk.db?mode=rwc");
    let source_base_url = lookup("POSTKIOSK_SOURCE_URL").ok();

    let handles: Vec<String> = lookup("POSTKIOSK_HANDLES")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let handles_path = PathBuf::from(or_default(
        "POSTKIOSK_HANDLES_PATH",
        "./config/handles.yaml",
    ));

    let log_level = or_default("POSTKIOSK_LOG_LEVEL", "info");

    let max_posts = parse_usize("POSTKIOSK_MAX_POSTS", "30")?;
    let refresh_interval_secs = parse_u64("POSTKIOSK_REFRESH_INTERVAL_SECS", "3600")?;

    let dwell_secs = parse_u64("POSTKIOSK_DWELL_SECS", "8")?;
    let fade_ms = parse_u64("POSTKIOSK_FADE_MS", "400")?;
    let frame_rate = parse_u32("POSTKIOSK_FRAME_RATE", "30")?;

    let db_max_connections = parse_u32("POSTKIOSK_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("POSTKIOSK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("POSTKIOSK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let source_request_timeout_secs = parse_u64("POSTKIOSK_SOURCE_REQUEST_TIMEOUT_SECS", "30")?;
    let source_user_agent = or_default("POSTKIOSK_SOURCE_USER_AGENT", "postkiosk/0.1");
    let source_max_retries = parse_u32("POSTKIOSK_SOURCE_MAX_RETRIES", "3")?;
    let source_backoff_base_secs = parse_u64("POSTKIOSK_SOURCE_BACKOFF_BASE_SECS", "2")?;

    let rate_limit_max_retries = parse_u32("POSTKIOSK_RATE_LIMIT_MAX_RETRIES", "2")?;
    let rate_limit_wait_cap_secs = parse_u64("POSTKIOSK_RATE_LIMIT_WAIT_CAP_SECS", "60")?;

    Ok(AppConfig {
        database_url,
        source_base_url,
        handles,
        handles_path,
        log_level,
        max_posts,
        refresh_interval_secs,
        dwell_secs,
        fade_ms,
        frame_rate,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        source_request_timeout_secs,
        source_user_agent,
        source_max_retries,
        source_backoff_base_secs,
        rate_limit_max_retries,
        rate_limit_wait_cap_secs,
    })
}
