//! Operator configuration for Avatarium.
//!
//! `AvatarConfig` represents `config.toml` in the data directory. Every field
//! has a default, so an empty file is valid.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Window in which debounced writes of the record file coalesce.
    #[serde(default = "default_flush_debounce_secs")]
    pub flush_debounce_secs: u64,

    /// Base URL of the sprite mirror hosting official and `#` avatars.
    #[serde(default = "default_sprite_mirror_url")]
    pub sprite_mirror_url: String,

    /// Directory holding side-server file avatars. Defaults to `{data_dir}/avatars`.
    #[serde(default)]
    pub avatar_dir: Option<PathBuf>,

    /// Upper bound on a single mirror existence probe.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// File name of the durable record, relative to the data directory.
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// Pre-migration grant settings. Read once, then should be removed.
    #[serde(default)]
    pub legacy: LegacyAvatarConfig,
}

fn default_flush_debounce_secs() -> u64 {
    60
}

fn default_sprite_mirror_url() -> String {
    "https://play.pokemonshowdown.com".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_store_file() -> String {
    "custom-avatars.json".to_string()
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            flush_debounce_secs: default_flush_debounce_secs(),
            sprite_mirror_url: default_sprite_mirror_url(),
            avatar_dir: None,
            probe_timeout_secs: default_probe_timeout_secs(),
            store_file: default_store_file(),
            legacy: LegacyAvatarConfig::default(),
        }
    }
}

/// The two flat maps grants used to live in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAvatarConfig {
    /// user -> personal avatar
    #[serde(default)]
    pub custom_avatars: BTreeMap<String, String>,

    /// avatar -> users allowed to use it
    #[serde(default)]
    pub allowed_avatars: BTreeMap<String, Vec<String>>,
}

impl LegacyAvatarConfig {
    pub fn is_empty(&self) -> bool {
        self.custom_avatars.is_empty() && self.allowed_avatars.is_empty()
    }
}
