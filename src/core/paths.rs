use crate::{DanbError, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// Cache the paths to avoid repeated environment lookups
static DANB_HOME: OnceLock<PathBuf> = OnceLock::new();
static DANB_CACHE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the danb home directory
/// Checks DANB_HOME environment variable, falls back to ${HOME}/.danb
pub fn danb_home() -> PathBuf {
    DANB_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("DANB_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".danb")
            }
        })
        .clone()
}

/// Get the sequence cache directory
/// Checks DANB_CACHE_DIR environment variable, falls back to DANB_HOME/cache
pub fn danb_cache_dir() -> PathBuf {
    DANB_CACHE_DIR
        .get_or_init(|| {
            if let Ok(path) = std::env::var("DANB_CACHE_DIR") {
                PathBuf::from(path)
            } else {
                danb_home().join("cache")
            }
        })
        .clone()
}

/// Get the default configuration file path
/// Checks DANB_CONFIG environment variable, falls back to DANB_HOME/config.yaml
pub fn default_config_path() -> PathBuf {
    std::env::var("DANB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| danb_home().join("config.yaml"))
}

/// Deterministic cache entry for a sequence identifier.
///
/// The identifier becomes a file name, so empty identifiers, `.`/`..` and
/// anything containing a path separator are rejected.
pub fn cache_entry(cache_dir: &Path, id: &str) -> Result<PathBuf> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(DanbError::InvalidIdentifier(id.to_string()));
    }
    Ok(cache_dir.join(format!("{}.fasta", id)))
}
