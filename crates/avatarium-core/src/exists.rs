//! Asset existence checks and avatar validation.
//!
//! Whether a custom avatar exists depends on the operator's avatar directory
//! and on a live probe of the remote sprite mirror, so both are behind the
//! [`AssetExistenceChecker`] port. The HTTP/filesystem adapter lives in
//! avatarium-infra.

use avatarium_types::avatar::{AvatarId, AvatarKind};
use avatarium_types::error::AvatarError;

use crate::catalog::OfficialCatalog;

/// Looks up backing assets for non-official avatars.
pub trait AssetExistenceChecker: Send + Sync {
    /// Whether a side-server image file with this name is present.
    fn file_exists(&self, file_name: &str) -> impl std::future::Future<Output = bool> + Send;

    /// Whether the mirror serves a custom sprite under this name (no `#`).
    ///
    /// Failures and timeouts count as "does not exist".
    fn custom_exists(&self, name: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Whether `avatar` resolves to an existing asset.
pub async fn avatar_exists<A: AssetExistenceChecker>(
    avatar: &AvatarId,
    catalog: &OfficialCatalog,
    checker: &A,
) -> bool {
    match avatar.kind() {
        AvatarKind::File => checker.file_exists(avatar.as_str()).await,
        AvatarKind::Official => catalog.contains(avatar),
        AvatarKind::ServerCustom => checker.custom_exists(avatar.bare_name()).await,
    }
}

/// Parse operator input and confirm the avatar can be granted.
///
/// Fails with `InvalidFormat` for malformed input, `NotFound` when no asset
/// backs it, and `AlreadyUniversal` for official avatars unless
/// `allow_official` is set.
pub async fn validate_avatar<A: AssetExistenceChecker>(
    raw: &str,
    allow_official: bool,
    catalog: &OfficialCatalog,
    checker: &A,
) -> Result<AvatarId, AvatarError> {
    let avatar = AvatarId::parse(raw)?;
    if !avatar_exists(&avatar, catalog, checker).await {
        tracing::debug!(avatar = %avatar, "avatar has no backing asset");
        return Err(AvatarError::NotFound(avatar.to_string()));
    }
    if !allow_official && catalog.contains(&avatar) {
        return Err(AvatarError::AlreadyUniversal(avatar.to_string()));
    }
    Ok(avatar)
}


#[cfg(test)]
mod tests {
    use super::testing::StaticAssets;
    use super::*;

    fn assets() -> StaticAssets {
        StaticAssets::default()
            .with_file("zarel.png")
            .with_custom("champion")
    }

    #[tokio::test]
    async fn test_exists_by_kind() {
        let catalog = OfficialCatalog::global();
        let checker = assets();
        assert!(avatar_exists(&AvatarId::normalize("zarel.png"), catalog, &checker).await);
        assert!(avatar_exists(&AvatarId::normalize("#champion"), catalog, &checker).await);
        assert!(avatar_exists(&AvatarId::normalize("lucas"), catalog, &checker).await);
        assert!(!avatar_exists(&AvatarId::normalize("#nobody"), catalog, &checker).await);
        assert!(!avatar_exists(&AvatarId::normalize("nobody"), catalog, &checker).await);
    }

    #[tokio::test]
    async fn test_validate_official_when_allowed() {
        let avatar = validate_avatar("Erika-GEN2!!", true, OfficialCatalog::global(), &assets())
            .await
            .unwrap();
        assert_eq!(avatar.as_str(), "erika-gen2");
    }

    #[tokio::test]
    async fn test_validate_rejects_universal() {
        let err = validate_avatar("lucas", false, OfficialCatalog::global(), &assets())
            .await
            .unwrap_err();
        assert_eq!(err, AvatarError::AlreadyUniversal("lucas".to_string()));
    }

    #[tokio::test]
    async fn test_validate_not_found() {
        let err = validate_avatar("#ghost", false, OfficialCatalog::global(), &assets())
            .await
            .unwrap_err();
        assert_eq!(err, AvatarError::NotFound("#ghost".to_string()));
    }

    #[tokio::test]
    async fn test_validate_invalid_format() {
        let err = validate_avatar("a#b", false, OfficialCatalog::global(), &assets())
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn test_validate_folds_marker_on_file() {
        let avatar = validate_avatar("#Zarel.PNG", false, OfficialCatalog::global(), &assets())
            .await
            .unwrap();
        assert_eq!(avatar.as_str(), "zarel.png");
    }
}
