use thiserror::Error;

/// User-facing errors from avatar grant and lookup operations.
///
/// All variants are recoverable and their messages are shown verbatim to the
/// operator who issued the command. None of them indicates store corruption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
    #[error("'{0}' is not a valid avatar identifier")]
    InvalidFormat(String),

    #[error("avatar '{0}' does not exist")]
    NotFound(String),

    #[error("'{0}' is an official avatar that every user can already use")]
    AlreadyUniversal(String),

    #[error("{}", no_such_grant(.user, .avatar.as_deref()))]
    NoSuchGrant {
        user: String,
        /// `None` when the user holds no grant at all.
        avatar: Option<String>,
    },

    #[error("'{0}' is not a valid username")]
    InvalidUsername(String),
}

fn no_such_grant(user: &str, avatar: Option<&str>) -> String {
    match avatar {
        Some(avatar) => format!("{user} does not have the avatar '{avatar}'"),
        None => format!("{user} does not have any custom avatars"),
    }
}

/// Errors from loading or writing the durable avatar record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record file exists but is not valid JSON of the expected shape.
    #[error("avatar record '{path}' is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    /// The record file exists but could not be read.
    #[error("avatar record '{path}' could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to write avatar record '{path}': {reason}")]
    Write { path: String, reason: String },

    #[error("failed to serialize avatar record: {0}")]
    Serialize(String),

    /// No record exists yet and the legacy settings to migrate from could not be loaded.
    #[error(
        "no avatar record at '{path}' and config.toml could not be loaded; \
         fix it so the legacy grants can be migrated"
    )]
    LegacyUnavailable { path: String },
}

/// Errors from loading `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config '{path}' could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("config '{path}' is invalid: {reason}")]
    Invalid { path: String, reason: String },
}
