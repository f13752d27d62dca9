//! Persistence port for the entry store.
//!
//! The mutator hands every post-change snapshot to a [`PersistenceGateway`]
//! and moves on; writing is the gateway's business. The debounced JSON file
//! writer lives in avatarium-infra.

use std::sync::Arc;

use avatarium_types::record::StoreSnapshot;

/// How soon a snapshot must reach durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// May be coalesced with later snapshots within the debounce window.
    Debounced,
    /// Written now, superseding anything pending.
    Immediate,
}

/// Fire-and-forget sink for store snapshots.
pub trait PersistenceGateway: Send + Sync {
    fn flush(&self, snapshot: StoreSnapshot, mode: FlushMode);
}

impl<T: PersistenceGateway + ?Sized> PersistenceGateway for Arc<T> {
    fn flush(&self, snapshot: StoreSnapshot, mode: FlushMode) {
        (**self).flush(snapshot, mode)
    }
}
