//! Background writer that coalesces snapshot writes.
//!
//! A debounced flush arms a timer for the configured window; snapshots that
//! arrive before it fires replace the pending one without re-arming it, so a
//! change is never more than one window old on disk. An immediate flush is
//! written at once and discards whatever was pending, since it is newer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use avatarium_core::persistence::{FlushMode, PersistenceGateway};
use avatarium_types::record::StoreSnapshot;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::SnapshotWriter;

enum Command {
    Flush(StoreSnapshot, FlushMode),
    Shutdown(oneshot::Sender<()>),
}

/// `PersistenceGateway` backed by a spawned writer task.
///
/// Must be created inside a tokio runtime.
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Command>,
    writes: Arc<AtomicUsize>,
}

impl DebouncedWriter {
    pub fn spawn<W: SnapshotWriter>(writer: W, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writes = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run(writer, window, rx, writes.clone()));
        Self { tx, writes }
    }

    /// Number of snapshots written so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Write anything pending and stop the writer task.
    ///
    /// Later flushes are dropped with an error log.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

impl PersistenceGateway for DebouncedWriter {
    fn flush(&self, snapshot: StoreSnapshot, mode: FlushMode) {
        if self.tx.send(Command::Flush(snapshot, mode)).is_err() {
            tracing::error!("avatar record writer has stopped; snapshot dropped");
        }
    }
}

async fn run<W: SnapshotWriter>(
    writer: W,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
    writes: Arc<AtomicUsize>,
) {
    let mut pending: Option<StoreSnapshot> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep_until(at) => {
                    deadline = None;
                    if let Some(snapshot) = pending.take() {
                        write(&writer, &snapshot, &writes).await;
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match command {
            Some(Command::Flush(snapshot, FlushMode::Debounced)) => {
                pending = Some(snapshot);
                deadline.get_or_insert_with(|| Instant::now() + window);
            }
            Some(Command::Flush(snapshot, FlushMode::Immediate)) => {
                pending = None;
                deadline = None;
                write(&writer, &snapshot, &writes).await;
            }
            Some(Command::Shutdown(ack)) => {
                if let Some(snapshot) = pending.take() {
                    write(&writer, &snapshot, &writes).await;
                }
                let _ = ack.send(());
                break;
            }
            // every sender dropped
            None => {
                if let Some(snapshot) = pending.take() {
                    write(&writer, &snapshot, &writes).await;
                }
                break;
            }
        }
    }
    tracing::debug!("avatar record writer stopped");
}

async fn write<W: SnapshotWriter>(writer: &W, snapshot: &StoreSnapshot, writes: &AtomicUsize) {
    match writer.write_snapshot(snapshot).await {
        Ok(()) => {
            writes.fetch_add(1, Ordering::SeqCst);
        }
        // The in-memory store stays authoritative; the next flush retries.
        Err(err) => tracing::error!("failed to persist avatar record: {err}"),
    }
}
