use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::AvatarError;

/// Longest accepted account id after normalization.
pub const MAX_USER_ID_LEN: usize = 18;

/// Case-normalized account identifier.
///
/// Built by lowercasing a display name and dropping every character outside
/// `[a-z0-9]`, so "Zarel", "zarel" and "ZA RE L!" all map to `zarel`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Normalize a raw name into an id without validating it.
    ///
    /// The result may be empty. Use [`UserId::parse`] where an empty or
    /// oversized name must be rejected.
    pub fn normalize(raw: &str) -> Self {
        Self(to_id(raw))
    }

    /// Normalize and validate an account name given to an administrative command.
    pub fn parse(raw: &str) -> Result<Self, AvatarError> {
        let id = to_id(raw);
        if id.is_empty() || id.len() > MAX_USER_ID_LEN {
            return Err(AvatarError::InvalidUsername(raw.trim().to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lowercase and strip non-alphanumerics.
pub fn to_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
