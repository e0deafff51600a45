//! Durable CRUD over drawings, with live snapshots for observers.
//!
//! All operations run on one background worker thread, so they never block
//! the caller and are applied in the order they were issued. The returned
//! futures only report the outcome: an operation is queued as soon as the
//! method is called, whether or not the future is polled.

mod backend;
mod file_backend;
mod subscription;

pub use backend::{MemoryBackend, Row, ScannedRow, StorageBackend};
pub use file_backend::FileBackend;
pub use subscription::{CorruptRecord, DrawingSummary, Snapshot, SnapshotEntry, SnapshotReceiver};

use std::sync::Arc;

use futures::channel::{mpsc, oneshot};
use futures::executor::ThreadPool;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;

use crate::codec;
use crate::config::StoreConfig;
use crate::document::{Drawing, DrawingId};
use crate::error::{StoreError, StoreResult};
use crate::stroke::Segment;
use subscription::Subscribers;

pub type StoreFuture<T> = BoxFuture<'static, StoreResult<T>>;

struct Shared {
    backend: Box<dyn StorageBackend>,
    subscribers: Subscribers,
}

impl Shared {
    fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot::from_rows(self.backend.scan()?))
    }

    /// Publish the committed state. Called with the lock held, so subscribers
    /// see mutations in commit order.
    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        match self.snapshot() {
            Ok(snapshot) => self.subscribers.emit(&snapshot),
            Err(err) => log::error!("Failed to read drawings for subscribers: {}", err),
        }
    }

    fn existing_row(&self, id: DrawingId) -> StoreResult<Row> {
        self.backend.load(id)?.ok_or(StoreError::NotFound(id))
    }
}

/// Handle to the drawing table. Cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct DrawingStore {
    shared: Arc<Mutex<Shared>>,
    worker: ThreadPool,
}

impl std::fmt::Debug for DrawingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingStore")
            .field("subscribers", &self.shared.lock().subscribers)
            .finish_non_exhaustive()
    }
}

impl DrawingStore {
    pub fn new(backend: impl StorageBackend + 'static) -> StoreResult<Self> {
        // A single worker keeps operations in issue order.
        let worker = ThreadPool::builder()
            .pool_size(1)
            .name_prefix("drawing-store-")
            .create()
            .map_err(StoreError::Worker)?;

        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                backend: Box::new(backend),
                subscribers: Subscribers::default(),
            })),
            worker,
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::new(MemoryBackend::new())
    }

    /// Open (or create) file storage under `config.data_dir`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        Self::new(FileBackend::from_config(config)?)
    }

    fn run<T, F>(&self, op: F) -> StoreFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Shared) -> StoreResult<T> + Send + 'static,
    {
        self.run_then(op, |_| ())
    }

    /// Like [`Self::run`], with `then` called on the worker right after `op`,
    /// whether or not anyone awaits the returned future.
    fn run_then<T, F, H>(&self, op: F, then: H) -> StoreFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Shared) -> StoreResult<T> + Send + 'static,
        H: FnOnce(&StoreResult<T>) + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        self.worker.spawn_ok(async move {
            let result = op(&mut shared.lock());
            if let Err(err) = &result {
                log::warn!("Drawing store operation failed: {}", err);
            }
            then(&result);
            // The caller may have dropped the future; the work is done regardless.
            let _ = tx.send(result);
        });
        async move { rx.await.unwrap_or(Err(StoreError::Closed)) }.boxed()
    }

    /// Create a new record and return its freshly assigned id.
    pub fn insert(&self, name: impl Into<String>, segments: Vec<Segment>) -> StoreFuture<DrawingId> {
        self.insert_then(name, segments, |_| ())
    }

    pub(crate) fn insert_then(
        &self,
        name: impl Into<String>,
        segments: Vec<Segment>,
        then: impl FnOnce(&StoreResult<DrawingId>) + Send + 'static,
    ) -> StoreFuture<DrawingId> {
        let name = name.into();
        self.run_then(
            move |shared| {
                let draw = codec::encode_segments(&segments)?;
                let id = shared.backend.insert(name, draw)?;
                log::info!("Inserted drawing {} with {} segments", id, segments.len());
                shared.notify();
                Ok(id)
            },
            then,
        )
    }

    /// Overwrite the segments of an existing record; its name is kept.
    pub fn update(&self, id: DrawingId, segments: Vec<Segment>) -> StoreFuture<()> {
        self.run(move |shared| {
            let mut row = shared.existing_row(id)?;
            row.draw = codec::encode_segments(&segments)?;
            shared.backend.write(&row)?;
            log::info!("Updated drawing {} with {} segments", id, segments.len());
            shared.notify();
            Ok(())
        })
    }

    /// Change the name of an existing record; its segments are kept.
    pub fn rename(&self, id: DrawingId, name: impl Into<String>) -> StoreFuture<()> {
        let name = name.into();
        self.run(move |shared| {
            let mut row = shared.existing_row(id)?;
            row.name = name;
            shared.backend.write(&row)?;
            log::info!("Renamed drawing {} to {:?}", id, row.name);
            shared.notify();
            Ok(())
        })
    }

    /// Overwrite name and segments of an existing record in one row write.
    pub fn save(
        &self,
        id: DrawingId,
        name: impl Into<String>,
        segments: Vec<Segment>,
    ) -> StoreFuture<()> {
        self.save_then(id, name, segments, |_| ())
    }

    pub(crate) fn save_then(
        &self,
        id: DrawingId,
        name: impl Into<String>,
        segments: Vec<Segment>,
        then: impl FnOnce(&StoreResult<()>) + Send + 'static,
    ) -> StoreFuture<()> {
        let name = name.into();
        self.run_then(
            move |shared| {
                shared.existing_row(id)?;
                let draw = codec::encode_segments(&segments)?;
                shared.backend.write(&Row { id, name, draw })?;
                log::info!("Saved drawing {} with {} segments", id, segments.len());
                shared.notify();
                Ok(())
            },
            then,
        )
    }

    /// Remove a record. Removing an id that does not exist is a no-op.
    pub fn delete(&self, id: DrawingId) -> StoreFuture<()> {
        self.run(move |shared| {
            if shared.backend.remove(id)? {
                log::info!("Deleted drawing {}", id);
                shared.notify();
            } else {
                log::debug!("Delete of missing drawing {} ignored", id);
            }
            Ok(())
        })
    }

    pub fn get(&self, id: DrawingId) -> StoreFuture<Drawing> {
        self.run(move |shared| {
            let row = shared.existing_row(id)?;
            let segments = codec::decode_segments(&row.draw).map_err(|err| (id, err))?;
            Ok(Drawing::stored(id, row.name, segments))
        })
    }

    pub fn get_all(&self) -> StoreFuture<Snapshot> {
        self.run(|shared| shared.snapshot())
    }

    /// Live view of the whole table.
    ///
    /// The first item is the current contents; after that one snapshot
    /// arrives per committed insert, update, rename, save or effective delete.
    pub fn subscribe_all(&self) -> SnapshotReceiver {
        let (tx, rx) = mpsc::unbounded();
        let shared = Arc::clone(&self.shared);
        self.worker.spawn_ok(async move {
            let mut shared = shared.lock();
            match shared.snapshot() {
                Ok(snapshot) => {
                    if tx.unbounded_send(snapshot).is_ok() {
                        shared.subscribers.add(tx);
                    }
                }
                // Dropping `tx` ends the stream.
                Err(err) => log::error!("Failed to read drawings for new subscriber: {}", err),
            }
        });
        rx
    }

    /// Live view of one record; `None` while no record has that id.
    pub fn subscribe(&self, id: DrawingId) -> BoxStream<'static, Option<SnapshotEntry>> {
        self.subscribe_all()
            .map(move |snapshot| snapshot.find(id).cloned())
            .boxed()
    }
}
