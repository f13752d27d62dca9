use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::AvatarError;

/// Marker prefix for avatars hosted on the central custom-avatar mirror.
pub const CUSTOM_MARKER: char = '#';

/// Suffix that marks a seasonal avatar preferred during December.
pub const SEASONAL_SUFFIX: &str = "xmas";

/// Relative sprite directory for built-in trainer avatars.
pub const OFFICIAL_SPRITE_DIR: &str = "sprites/trainers";

/// Relative sprite directory for mirror-hosted custom avatars.
pub const CUSTOM_SPRITE_DIR: &str = "sprites/trainers-custom";

/// Normalized avatar identifier.
///
/// Three textual shapes exist:
///
/// - official: `^[a-z0-9-]+$` (only usable when listed in the official catalog)
/// - server-custom: `^#[a-z0-9-]+$`
/// - side-server file: `^[a-z0-9.-]+$` containing a `.`
///
/// Stored identifiers are kept verbatim; only operator input goes through
/// [`AvatarId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarId(String);

/// Which kind of asset an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarKind {
    /// Bare identifier; a real asset only when the official catalog lists it.
    Official,
    /// `#`-prefixed identifier served by the remote sprite mirror.
    ServerCustom,
    /// Image file hosted by the operator.
    File,
}

impl fmt::Display for AvatarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarKind::Official => write!(f, "official"),
            AvatarKind::ServerCustom => write!(f, "server-custom"),
            AvatarKind::File => write!(f, "file"),
        }
    }
}

impl AvatarId {
    /// Lowercase and strip everything outside `[a-z0-9-.#]`.
    ///
    /// No grammar check is made; lookups use this so "Erika-GEN2!!" finds
    /// `erika-gen2`.
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_str(raw))
    }

    /// Normalize operator input and check it against the identifier grammar.
    ///
    /// A `#` marker on a file name is dropped, since file avatars are never
    /// served by the mirror.
    pub fn parse(raw: &str) -> Result<Self, AvatarError> {
        let normalized = normalize_str(raw);
        let invalid = || AvatarError::InvalidFormat(raw.trim().to_string());

        if let Some(body) = normalized.strip_prefix(CUSTOM_MARKER) {
            if body.contains('.') {
                return if is_file_name(body) {
                    Ok(Self(body.to_string()))
                } else {
                    Err(invalid())
                };
            }
            return if is_bare_name(body) {
                Ok(Self(normalized))
            } else {
                Err(invalid())
            };
        }

        if normalized.contains('.') {
            if is_file_name(&normalized) {
                return Ok(Self(normalized));
            }
            return Err(invalid());
        }

        if is_bare_name(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(invalid())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> AvatarKind {
        if self.0.starts_with(CUSTOM_MARKER) {
            AvatarKind::ServerCustom
        } else if self.0.contains('.') {
            AvatarKind::File
        } else {
            AvatarKind::Official
        }
    }

    /// Name without the leading `#`, as used in mirror sprite paths.
    pub fn bare_name(&self) -> &str {
        self.0.strip_prefix(CUSTOM_MARKER).unwrap_or(&self.0)
    }

    /// The same identifier with a `#` marker added, if it has none.
    pub fn with_custom_marker(&self) -> Option<Self> {
        if self.0.starts_with(CUSTOM_MARKER) {
            None
        } else {
            Some(Self(format!("{CUSTOM_MARKER}{}", self.0)))
        }
    }

    /// The same identifier with its leading `#` removed, if it has one.
    pub fn without_custom_marker(&self) -> Option<Self> {
        self.0
            .strip_prefix(CUSTOM_MARKER)
            .map(|body| Self(body.to_string()))
    }

    pub fn is_seasonal(&self) -> bool {
        self.0.ends_with(SEASONAL_SUFFIX)
    }

    /// Relative sprite path on the mirror, `None` for file avatars.
    pub fn asset_path(&self) -> Option<String> {
        match self.kind() {
            AvatarKind::Official => Some(format!("{OFFICIAL_SPRITE_DIR}/{}.png", self.0)),
            AvatarKind::ServerCustom => {
                Some(format!("{CUSTOM_SPRITE_DIR}/{}.png", self.bare_name()))
            }
            AvatarKind::File => None,
        }
    }
}

fn normalize_str(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '#'))
        .collect()
}

/// `^[a-z0-9-]+$`
fn is_bare_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// `^[a-z0-9.-]+$` with a `.`, not starting with `.`
fn is_file_name(s: &str) -> bool {
    !s.starts_with('.')
        && s.contains('.')
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}

impl fmt::Display for AvatarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AvatarId {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for AvatarId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(AvatarId::normalize("Erika-GEN2!!").as_str(), "erika-gen2");
    }

    #[test]
    fn test_parse_official_shape() {
        let id = AvatarId::parse("Erika-GEN2!!").unwrap();
        assert_eq!(id.as_str(), "erika-gen2");
        assert_eq!(id.kind(), AvatarKind::Official);
    }

    #[test]
    fn test_parse_server_custom() {
        let id = AvatarId::parse("#Zarel").unwrap();
        assert_eq!(id.as_str(), "#zarel");
        assert_eq!(id.kind(), AvatarKind::ServerCustom);
        assert_eq!(id.bare_name(), "zarel");
    }

    #[test]
    fn test_parse_file_folds_custom_marker() {
        let id = AvatarId::parse("#zarel.png").unwrap();
        assert_eq!(id.as_str(), "zarel.png");
        assert_eq!(id.kind(), AvatarKind::File);
    }

    #[test]
    fn test_parse_rejects_empty_and_misplaced_marker() {
        assert!(matches!(
            AvatarId::parse("!!!"),
            Err(AvatarError::InvalidFormat(_))
        ));
        assert!(matches!(
            AvatarId::parse("ab#cd"),
            Err(AvatarError::InvalidFormat(_))
        ));
        assert!(matches!(
            AvatarId::parse("#"),
            Err(AvatarError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_dot_leading_file() {
        assert!(matches!(
            AvatarId::parse(".."),
            Err(AvatarError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_marker_helpers() {
        let bare = AvatarId::normalize("foo");
        assert_eq!(bare.with_custom_marker().unwrap().as_str(), "#foo");
        assert!(bare.without_custom_marker().is_none());

        let custom = AvatarId::normalize("#foo");
        assert!(custom.with_custom_marker().is_none());
        assert_eq!(custom.without_custom_marker().unwrap().as_str(), "foo");
    }

    #[test]
    fn test_asset_paths() {
        assert_eq!(
            AvatarId::normalize("lucas").asset_path().as_deref(),
            Some("sprites/trainers/lucas.png")
        );
        assert_eq!(
            AvatarId::normalize("#foo").asset_path().as_deref(),
            Some("sprites/trainers-custom/foo.png")
        );
        assert_eq!(AvatarId::normalize("foo.gif").asset_path(), None);
    }

    #[test]
    fn test_seasonal_suffix() {
        assert!(AvatarId::normalize("#santaxmas").is_seasonal());
        assert!(!AvatarId::normalize("#xmasfoo").is_seasonal());
    }
}
