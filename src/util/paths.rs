//! Path utilities for deckhand data directories

use std::path::PathBuf;
use std::sync::OnceLock;

/// Global storage for custom data directory path
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the data directory with an optional custom path.
/// Must be called early in main() before any other path functions are used.
/// If custom_path is None, uses the default ~/.deckhand location.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        let existing = DATA_DIR
            .get()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::debug!(
            path = %path.display(),
            existing = %existing,
            "Data directory already initialized"
        );
    }
}

/// Get the default data directory path (~/.deckhand)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".deckhand"))
        .unwrap_or_else(|| PathBuf::from(".deckhand"))
}

/// Get the base data directory.
/// Returns the custom path if set via init_data_dir(), otherwise ~/.deckhand
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

/// Get the logs directory (~/.deckhand/logs)
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the default log file path (~/.deckhand/logs/deckhand.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join("deckhand.log")
}

/// Directory holding per-window output capture files (~/.deckhand/captures)
pub fn captures_dir() -> PathBuf {
    data_dir().join("captures")
}

/// Get the config file path (~/.deckhand/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}
