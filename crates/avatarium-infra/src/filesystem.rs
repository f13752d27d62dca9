//! Data directory resolution.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AVATARIUM_DATA_DIR";

/// Resolve the Avatarium data directory.
///
/// Uses `AVATARIUM_DATA_DIR` if set, otherwise `~/.avatarium`, otherwise
/// `./.avatarium`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".avatarium");
    }

    PathBuf::from(".avatarium")
}
