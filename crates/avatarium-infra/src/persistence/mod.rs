//! Durable storage for the entry store.
//!
//! [`JsonFileStore`] owns the on-disk record, [`DebouncedWriter`] implements the
//! core `PersistenceGateway` port on top of it, and [`load_store`] rebuilds the
//! in-memory store at startup.

pub mod debounced;
pub mod json_file;
pub mod loader;

pub use debounced::DebouncedWriter;
pub use json_file::JsonFileStore;
pub use loader::load_store;

use avatarium_types::error::StoreError;
use avatarium_types::record::StoreSnapshot;

/// Destination for whole-store snapshots.
pub trait SnapshotWriter: Send + Sync + 'static {
    fn write_snapshot(
        &self,
        snapshot: &StoreSnapshot,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
