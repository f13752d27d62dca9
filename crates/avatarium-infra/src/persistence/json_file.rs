//! The durable avatar record as a single JSON file.
//!
//! Writes go to a sibling temp file that is then renamed over the target, so
//! a crash mid-write leaves the previous record intact.

use std::path::{Path, PathBuf};

use avatarium_types::error::StoreError;
use avatarium_types::record::StoreSnapshot;

use super::SnapshotWriter;

/// JSON file holding the whole store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    /// Read and parse the record.
    ///
    /// `Ok(None)` only when the file does not exist. Any other read failure or
    /// a parse failure is an error; existing grants are never silently
    /// replaced by an empty store.
    pub async fn read(&self) -> Result<Option<StoreSnapshot>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No avatar record at {}", self.display());
                return Ok(None);
            }
            Err(err) => {
                return Err(StoreError::Unreadable {
                    path: self.display(),
                    reason: err.to_string(),
                });
            }
        };

        serde_json::from_str::<StoreSnapshot>(&content)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                path: self.display(),
                reason: err.to_string(),
            })
    }

    /// Atomically replace the record with `snapshot`.
    pub async fn write(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(snapshot).map_err(|e| StoreError::Serialize(e.to_string()))?;

        let write_err = |err: std::io::Error| StoreError::Write {
            path: self.display(),
            reason: err.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;

        tracing::debug!(entries = snapshot.len(), "wrote avatar record to {}", self.display());
        Ok(())
    }
}

impl SnapshotWriter for JsonFileStore {
    async fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        self.write(snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> StoreSnapshot {
        serde_json::from_value(serde_json::json!({
            "alice": {"allowed": [null, "#cup"], "notNotified": true},
            "bob": {"allowed": ["bob.png"], "default": null},
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("custom-avatars.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("nested").join("custom-avatars.json"));
        store.write(&sample()).await.unwrap();

        let read = store.read().await.unwrap().unwrap();
        assert_eq!(read, sample());
        assert!(!tmp.path().join("nested").join("custom-avatars.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_null_placeholders_survive_on_disk() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("custom-avatars.json"));
        store.write(&sample()).await.unwrap();

        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["alice"]["allowed"], serde_json::json!([null, "#cup"]));
        assert_eq!(json["bob"]["default"], serde_json::Value::Null);
        assert!(json["bob"].get("notNotified").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom-avatars.json");
        tokio::fs::write(&path, "{ this is not json").await.unwrap();

        let err = JsonFileStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // the file is left alone
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(raw, "{ this is not json");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom-avatars.json");
        tokio::fs::write(&path, r#"{"alice": "alice.png"}"#).await.unwrap();

        let err = JsonFileStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_directory_in_place_of_file_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom-avatars.json");
        tokio::fs::create_dir_all(&path).await.unwrap();

        let err = JsonFileStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, StoreError::Unreadable { .. }));
    }
}
