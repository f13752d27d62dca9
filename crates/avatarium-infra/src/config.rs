//! Configuration loader for Avatarium.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`AvatarConfig`]. A missing file means defaults; a file that is present but
//! unreadable or malformed is reported so the caller can decide whether the
//! defaults are safe to run with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use avatarium_types::config::AvatarConfig;
use avatarium_types::error::ConfigError;

/// Smallest accepted debounce window.
const MIN_DEBOUNCE_SECS: u64 = 1;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AvatarConfig::default()`].
/// - If the file exists but fails to read or parse, returns the error.
pub async fn load_config(data_dir: &Path) -> Result<AvatarConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(AvatarConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Unreadable {
                path: config_path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    toml::from_str::<AvatarConfig>(&content).map_err(|err| ConfigError::Invalid {
        path: config_path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Debounce window for record writes, never below one second.
pub fn debounce_window(config: &AvatarConfig) -> Duration {
    Duration::from_secs(config.flush_debounce_secs.max(MIN_DEBOUNCE_SECS))
}

/// Directory holding side-server file avatars.
pub fn avatar_dir(config: &AvatarConfig, data_dir: &Path) -> PathBuf {
    config
        .avatar_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("avatars"))
}

/// Path of the durable avatar record.
pub fn store_path(config: &AvatarConfig, data_dir: &Path) -> PathBuf {
    data_dir.join(&config.store_file)
}
