//! Startup loading of the entry store.

use avatarium_core::migration::{MigrationReport, migrate_legacy};
use avatarium_core::store::EntryStore;
use avatarium_types::config::LegacyAvatarConfig;
use avatarium_types::error::StoreError;

use super::JsonFileStore;

/// Rebuild the entry store from the durable record.
///
/// When no record exists yet, the legacy configuration maps are migrated and
/// the result is written out before returning, so migration happens once.
/// `legacy` is `None` when the configuration holding them could not be
/// loaded; migrating then would persist an empty store over grants that were
/// never read, so it is refused.
/// A record that exists but cannot be read or parsed is an error.
pub async fn load_store(
    file: &JsonFileStore,
    legacy: Option<&LegacyAvatarConfig>,
) -> Result<(EntryStore, MigrationReport), StoreError> {
    match file.read().await? {
        Some(snapshot) => {
            let (store, dropped) = EntryStore::from_snapshot(snapshot);
            for key in &dropped {
                tracing::warn!(user = %key, "dropping avatar record with no avatars");
            }
            tracing::info!(
                users = store.len(),
                "loaded avatar record from {}",
                file.path().display()
            );
            Ok((store, MigrationReport::not_needed()))
        }
        None => {
            let Some(legacy) = legacy else {
                return Err(StoreError::LegacyUnavailable {
                    path: file.path().display().to_string(),
                });
            };
            let (store, report) = migrate_legacy(legacy);
            file.write(&store.snapshot()).await?;
            Ok((store, report))
        }
    }
}
