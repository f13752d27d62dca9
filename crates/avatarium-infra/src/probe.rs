//! Asset existence checks against the avatar directory and the sprite mirror.

use std::path::PathBuf;
use std::time::Duration;

use avatarium_core::exists::AssetExistenceChecker;
use avatarium_types::avatar::{AvatarId, CUSTOM_SPRITE_DIR};

/// Checks file avatars on disk and `#` avatars with an HTTP `HEAD` against
/// the mirror.
pub struct MirrorAssetChecker {
    client: reqwest::Client,
    mirror_url: String,
    avatar_dir: PathBuf,
}

impl MirrorAssetChecker {
    /// Fails if the HTTP client cannot be built; a client without the
    /// timeout would let one stalled mirror request hang a grant.
    pub fn new(
        mirror_url: &str,
        avatar_dir: PathBuf,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("avatarium/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            mirror_url: mirror_url.trim_end_matches('/').to_string(),
            avatar_dir,
        })
    }

    /// Public URL of the sprite for `avatar`, if the mirror serves it.
    pub fn asset_url(&self, avatar: &AvatarId) -> Option<String> {
        asset_url(&self.mirror_url, avatar)
    }
}

/// `{mirror}/{asset path}` for official and `#` avatars.
pub fn asset_url(mirror_url: &str, avatar: &AvatarId) -> Option<String> {
    avatar
        .asset_path()
        .map(|path| format!("{}/{path}", mirror_url.trim_end_matches('/')))
}

impl AssetExistenceChecker for MirrorAssetChecker {
    async fn file_exists(&self, file_name: &str) -> bool {
        if file_name.contains(['/', '\\']) {
            return false;
        }
        match tokio::fs::metadata(self.avatar_dir.join(file_name)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn custom_exists(&self, name: &str) -> bool {
        let url = format!("{}/{CUSTOM_SPRITE_DIR}/{name}.png", self.mirror_url);
        match self.client.head(&url).send().await {
            Ok(response) => {
                tracing::debug!(%url, status = %response.status(), "probed sprite mirror");
                response.status().is_success()
            }
            Err(err) => {
                tracing::debug!(%url, "sprite mirror probe failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_exists_checks_avatar_dir() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("zarel.png"), b"png").await.unwrap();
        tokio::fs::create_dir(tmp.path().join("folder.png")).await.unwrap();

        let checker = MirrorAssetChecker::new(
            "http://127.0.0.1:9",
            tmp.path().to_path_buf(),
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(checker.file_exists("zarel.png").await);
        assert!(!checker.file_exists("missing.png").await);
        assert!(!checker.file_exists("folder.png").await);
        assert!(!checker.file_exists("../zarel.png").await);
    }

    #[tokio::test]
    async fn test_unreachable_mirror_counts_as_missing() {
        let tmp = TempDir::new().unwrap();
        let checker = MirrorAssetChecker::new(
            "http://127.0.0.1:9",
            tmp.path().to_path_buf(),
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(!checker.custom_exists("zarel").await);
    }

    #[tokio::test]
    async fn test_stalled_mirror_is_cut_off_by_timeout() {
        let tmp = TempDir::new().unwrap();
        // accepts the connection and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let checker = MirrorAssetChecker::new(
            &format!("http://{addr}"),
            tmp.path().to_path_buf(),
            Duration::from_millis(200),
        )
        .unwrap();
        let found = tokio::time::timeout(Duration::from_secs(5), checker.custom_exists("zarel"))
            .await
            .expect("mirror request outlived the client timeout");
        assert!(!found);
        server.abort();
    }

    #[test]
    fn test_asset_url() {
        let mirror = "https://play.pokemonshowdown.com/";
        assert_eq!(
            asset_url(mirror, &AvatarId::normalize("#zarel")).as_deref(),
            Some("https://play.pokemonshowdown.com/sprites/trainers-custom/zarel.png")
        );
        assert_eq!(
            asset_url(mirror, &AvatarId::normalize("lucas")).as_deref(),
            Some("https://play.pokemonshowdown.com/sprites/trainers/lucas.png")
        );
        assert_eq!(asset_url(mirror, &AvatarId::normalize("zarel.png")), None);
    }
}
