//! Application state wiring the avatar service to its infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use avatarium_core::clock::SystemClock;
use avatarium_core::migration::MigrationReport;
use avatarium_core::service::AvatarService;
use avatarium_infra::config::{avatar_dir, debounce_window, load_config, store_path};
use avatarium_infra::filesystem::resolve_data_dir;
use avatarium_infra::persistence::{DebouncedWriter, JsonFileStore, load_store};
use avatarium_infra::probe::MirrorAssetChecker;
use avatarium_types::config::AvatarConfig;

use crate::messenger::ConsoleMessenger;

/// The avatar service pinned to the concrete infra implementations.
pub type ConcreteAvatarService =
    AvatarService<Arc<DebouncedWriter>, Arc<ConsoleMessenger>, SystemClock>;

pub struct AppState {
    pub service: ConcreteAvatarService,
    pub checker: MirrorAssetChecker,
    pub config: AvatarConfig,
    pub data_dir: PathBuf,
    /// What startup loading did, for one-time operator warnings.
    pub report: MigrationReport,
    writer: Arc<DebouncedWriter>,
}

impl AppState {
    /// Load config and the durable record, then wire the service.
    ///
    /// A record file that exists but cannot be read is fatal, and so is a
    /// broken `config.toml` when there is no record yet to fall back on.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        let (config, legacy_loaded) = match load_config(&data_dir).await {
            Ok(config) => (config, true),
            Err(err) => {
                tracing::warn!("{err}; using default settings");
                (AvatarConfig::default(), false)
            }
        };
        let file = JsonFileStore::new(store_path(&config, &data_dir));
        let (store, report) = load_store(&file, legacy_loaded.then_some(&config.legacy))
            .await
            .context("refusing to start without a usable avatar record")?;
        if !report.migrated && !config.legacy.is_empty() {
            tracing::warn!(
                "config.toml still has [legacy] avatar settings; they are ignored because {} exists",
                file.path().display()
            );
        }

        let writer = Arc::new(DebouncedWriter::spawn(file, debounce_window(&config)));
        let checker = MirrorAssetChecker::new(
            &config.sprite_mirror_url,
            avatar_dir(&config, &data_dir),
            Duration::from_secs(config.probe_timeout_secs),
        )
        .context("building the sprite mirror HTTP client")?;
        let service = AvatarService::new(
            store,
            writer.clone(),
            Arc::new(ConsoleMessenger::default()),
            SystemClock,
        );

        Ok(Self {
            service,
            checker,
            config,
            data_dir,
            report,
            writer,
        })
    }

    /// Write anything still pending before the process exits.
    pub async fn shutdown(&self) {
        self.writer.shutdown().await;
        tracing::debug!(writes = self.writer.write_count(), "avatar record writer flushed");
    }
}
