//! Loading the tracked-handles list from its YAML file.

use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::handle::normalize_handle;

#[derive(Debug, Deserialize)]
pub struct HandlesFile {
    pub handles: Vec<String>,
}

/// Load and validate the tracked handles from a YAML file of the form
/// `handles: [imVkohli, BCCI]`. Every entry is normalized; any invalid entry
/// rejects the whole file so misconfiguration is caught at startup, not
/// silently skipped every refresh.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or an entry
/// fails handle validation.
pub fn load_handles(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::HandlesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: HandlesFile = serde_yaml::from_str(&content)?;

    file.handles
        .iter()
        .map(|raw| normalize_handle(raw).map_err(ConfigError::from))
        .collect()
}
