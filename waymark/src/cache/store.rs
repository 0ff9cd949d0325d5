//! Persistent route store with an ordered background writer.
//!
//! The store keeps the authoritative set of persisted routes in memory and
//! mirrors every mutation to disk. Mutations never block on I/O: each one
//! marks the store dirty, and the [`StoreWriter`] task copies the current map
//! and writes it, one write at a time. Any number of mutations between two
//! writes cost a single pending signal and a single snapshot.

use super::file::RouteFile;
use crate::route::{RouteEntry, RouteKey};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Snapshot = HashMap<RouteKey, Arc<RouteEntry>>;

enum WriteCommand {
    Dirty,
    Flush(oneshot::Sender<()>),
}

/// State shared between the store and its writer task.
struct Shared {
    file: RouteFile,
    entries: RwLock<Snapshot>,
    /// Set while a `Dirty` signal is queued and not yet picked up
    pending: AtomicBool,
    /// Serializes inline writes so a stale copy never lands last
    inline: Mutex<()>,
}

impl Shared {
    fn write_current(&self) {
        let snapshot = self.entries.read().clone();
        if let Err(e) = self.file.save(&snapshot) {
            warn!(path = %self.file.path().display(), error = %e, "Failed to persist route cache");
        }
    }

    fn write_inline(&self) {
        let _guard = self.inline.lock();
        self.pending.store(false, Ordering::SeqCst);
        self.write_current();
    }
}

/// Schedules snapshot writes for one [`RouteFile`].
struct StoreWriter {
    shared: Arc<Shared>,
    /// `None` when constructed outside a Tokio runtime; writes go inline.
    tx: Option<mpsc::UnboundedSender<WriteCommand>>,
}

impl StoreWriter {
    fn spawn(shared: Arc<Shared>) -> Self {
        let tx = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = mpsc::unbounded_channel();
                handle.spawn(run_writer(Arc::clone(&shared), rx));
                Some(tx)
            }
            Err(_) => {
                debug!(path = %shared.file.path().display(), "No async runtime, route store writes inline");
                None
            }
        };
        Self { shared, tx }
    }

    /// Record that the map changed. Call after releasing the entries lock.
    fn mark_dirty(&self) {
        let Some(tx) = &self.tx else {
            self.shared.write_inline();
            return;
        };
        if self.shared.pending.swap(true, Ordering::SeqCst) {
            // A queued signal will pick this change up
            return;
        }
        if tx.send(WriteCommand::Dirty).is_err() {
            // Writer task is gone (runtime shut down)
            self.shared.write_inline();
        }
    }

    async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(WriteCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run_writer(shared: Arc<Shared>, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Dirty => {
                // Clear before copying so later mutations signal again
                shared.pending.store(false, Ordering::SeqCst);
                let shared = Arc::clone(&shared);
                if let Err(e) = tokio::task::spawn_blocking(move || shared.write_current()).await {
                    warn!(error = %e, "Route cache write task failed");
                }
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Durable route store backed by a JSON file.
///
/// Reads are served from memory. Writes update memory immediately and reach
/// disk through the background writer; [`flush`](Self::flush) waits for them.
pub struct PersistentRouteStore {
    shared: Arc<Shared>,
    writer: StoreWriter,
}

impl PersistentRouteStore {
    /// Open the store, loading and sweeping the backing file.
    ///
    /// Call from inside a Tokio runtime to get background writes.
    pub fn open(file: RouteFile) -> Self {
        let entries = file.load(SystemTime::now());
        let shared = Arc::new(Shared {
            file,
            entries: RwLock::new(entries),
            pending: AtomicBool::new(false),
            inline: Mutex::new(()),
        });
        Self {
            writer: StoreWriter::spawn(Arc::clone(&shared)),
            shared,
        }
    }

    /// Entry for `key`, whether or not it has expired since load.
    pub fn get(&self, key: &RouteKey) -> Option<Arc<RouteEntry>> {
        self.shared.entries.read().get(key).cloned()
    }

    /// Insert or replace an entry and schedule a write.
    pub fn insert(&self, key: RouteKey, entry: Arc<RouteEntry>) {
        self.shared.entries.write().insert(key, entry);
        self.writer.mark_dirty();
    }

    /// Remove an entry. A write is scheduled only if something was removed.
    pub fn remove(&self, key: &RouteKey) -> bool {
        let removed = self.shared.entries.write().remove(key).is_some();
        if removed {
            self.writer.mark_dirty();
        }
        removed
    }

    /// Drop entries expired at `now`. Returns the number removed.
    pub fn prune_expired(&self, now: SystemTime) -> usize {
        let ttl = self.ttl();
        let removed = {
            let mut entries = self.shared.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_valid_at(now, ttl));
            before - entries.len()
        };
        if removed > 0 {
            self.writer.mark_dirty();
        }
        removed
    }

    /// Remove every entry and schedule a write of the empty map.
    pub fn clear(&self) {
        self.shared.entries.write().clear();
        self.writer.mark_dirty();
    }

    /// Copy of the current entry map.
    pub fn snapshot(&self) -> HashMap<RouteKey, Arc<RouteEntry>> {
        self.shared.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.shared.file.ttl()
    }

    pub fn path(&self) -> &Path {
        self.shared.file.path()
    }

    /// Wait until every write scheduled before this call is on disk.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}

impl std::fmt::Debug for PersistentRouteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentRouteStore")
            .field("path", &self.path())
            .field("entries", &self.len())
            .finish()
    }
}
