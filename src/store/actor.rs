//! The store task.
//!
//! One task owns the pending graph and applies every mutation in the order it
//! arrives. Handles talk to it over a channel and get answers back on a
//! oneshot. The last committed graph is published as an immutable snapshot,
//! so reads never queue behind writes.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::StoreError;
use super::graph::{Graph, MergeOutcome};
use super::query::WeddingQuery;
use super::record::{Entity, EntityKind, Record};
use crate::db::{init_db, GraphRepository};
use crate::models::Wedding;

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;
type Mutation = Box<dyn FnOnce(&mut Graph) -> Result<Entity, StoreError> + Send>;

enum Command {
    Insert(Entity, Reply<()>),
    Update(Mutation, Reply<Entity>),
    Delete(EntityKind, Uuid, Reply<()>),
    Merge(Vec<Wedding>, Reply<MergeOutcome>),
    Save(Reply<usize>),
    Rollback(Reply<()>),
    HasChanges(Reply<bool>),
    Shutdown(Reply<()>),
}

/// State owned by the store task.
pub struct Store {
    repo: GraphRepository,
    committed: Arc<Graph>,
    pending: Graph,
    snapshot_tx: watch::Sender<Arc<Graph>>,
}

impl Store {
    /// Opens the database at `path`, loads it, and starts the store task.
    ///
    /// Every failure is reported as `StorageUnavailable`.
    pub async fn open(path: impl AsRef<Path>) -> Result<StoreHandle, StoreError> {
        let path = path.as_ref();
        let pool = init_db(path).await?;
        let repo = GraphRepository::new(pool);

        let committed = match repo.load().await {
            Ok(graph) => Arc::new(graph),
            Err(e) => {
                repo.pool().close().await;
                return Err(StoreError::StorageUnavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        info!(
            path = %path.display(),
            weddings = committed.count(EntityKind::Wedding),
            "store opened"
        );

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::clone(&committed));

        let store = Store {
            repo,
            pending: (*committed).clone(),
            committed,
            snapshot_tx,
        };
        tokio::spawn(store.run(rx));

        Ok(StoreHandle {
            tx,
            snapshot: snapshot_rx,
        })
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Insert(entity, reply) => {
                    let _ = reply.send(self.pending.insert(entity));
                }
                Command::Update(mutation, reply) => {
                    let _ = reply.send(mutation(&mut self.pending));
                }
                Command::Delete(kind, id, reply) => {
                    let _ = reply.send(self.pending.delete(kind, id));
                }
                Command::Merge(weddings, reply) => {
                    let _ = reply.send(self.merge(weddings).await);
                }
                Command::Save(reply) => {
                    let _ = reply.send(self.save().await);
                }
                Command::Rollback(reply) => {
                    self.pending = (*self.committed).clone();
                    debug!("pending changes rolled back");
                    let _ = reply.send(Ok(()));
                }
                Command::HasChanges(reply) => {
                    let _ = reply.send(Ok(self.has_changes()));
                }
                Command::Shutdown(reply) => {
                    self.close().await;
                    let _ = reply.send(Ok(()));
                    return;
                }
            }
        }

        // Every handle was dropped without an explicit shutdown.
        self.close().await;
    }

    fn has_changes(&self) -> bool {
        self.pending != *self.committed
    }

    /// Upserts a batch into the committed graph and persists only that.
    ///
    /// Unsaved local edits are not written. The same batch is replayed onto
    /// the pending graph, so those edits stay pending on top of it. On
    /// failure neither graph changes.
    async fn merge(&mut self, weddings: Vec<Wedding>) -> Result<MergeOutcome, StoreError> {
        let mut merged = (*self.committed).clone();
        let mut outcome = MergeOutcome::default();
        for wedding in weddings.iter().cloned() {
            outcome += merged.upsert_wedding(wedding);
        }

        let changes = Graph::diff(&self.committed, &merged);
        if !changes.is_empty() {
            if let Err(e) = self.repo.persist(&changes).await {
                error!("merge could not be saved: {}", e);
                return Err(e);
            }
            self.committed = Arc::new(merged);
            self.snapshot_tx.send_replace(Arc::clone(&self.committed));
        }

        for wedding in weddings {
            self.pending.upsert_wedding(wedding);
        }

        info!(%outcome, "merged remote weddings");
        Ok(outcome)
    }

    async fn save(&mut self) -> Result<usize, StoreError> {
        let changes = Graph::diff(&self.committed, &self.pending);
        if changes.is_empty() {
            return Ok(0);
        }

        self.repo.persist(&changes).await?;

        self.committed = Arc::new(self.pending.clone());
        self.snapshot_tx.send_replace(Arc::clone(&self.committed));
        debug!(changes = changes.len(), "saved");
        Ok(changes.len())
    }

    async fn close(&mut self) {
        if self.has_changes() {
            warn!("store shutting down with unsaved changes, discarding them");
        }
        self.repo.pool().close().await;
        info!("store closed");
    }
}

/// Cloneable address of the store task.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Arc<Graph>>,
}

impl StoreHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)?
    }

    pub async fn insert(&self, entity: impl Into<Entity>) -> Result<(), StoreError> {
        let entity: Entity = entity.into();
        self.request(|reply| Command::Insert(entity, reply)).await
    }

    pub async fn update<R: Record>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut R) + Send + 'static,
    ) -> Result<R, StoreError> {
        let mutation: Mutation = Box::new(move |graph: &mut Graph| {
            graph
                .update::<R>(id, f)
                .map(|record| Into::<Entity>::into(record))
        });
        let entity = self
            .request(|reply| Command::Update(mutation, reply))
            .await?;
        R::from_entity(entity).ok_or(StoreError::NotFound { kind: R::KIND, id })
    }

    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        self.request(|reply| Command::Delete(kind, id, reply)).await
    }

    /// Upserts remote weddings and commits them in one step.
    ///
    /// Only the merged records are written. Edits made through any handle
    /// and not yet saved stay pending.
    pub async fn merge_weddings(&self, weddings: Vec<Wedding>) -> Result<MergeOutcome, StoreError> {
        self.request(|reply| Command::Merge(weddings, reply)).await
    }

    /// Commits pending changes. Returns how many records were written or
    /// removed.
    pub async fn save(&self) -> Result<usize, StoreError> {
        self.request(Command::Save).await
    }

    pub async fn rollback(&self) -> Result<(), StoreError> {
        self.request(Command::Rollback).await
    }

    pub async fn has_changes(&self) -> Result<bool, StoreError> {
        self.request(Command::HasChanges).await
    }

    /// Last committed graph.
    pub fn snapshot(&self) -> Arc<Graph> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is notified after every successful save.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Graph>> {
        self.snapshot.clone()
    }

    pub fn weddings(&self, query: &WeddingQuery) -> Vec<Wedding> {
        self.snapshot().weddings(query)
    }

    /// Stops the task. Unsaved changes are discarded.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        self.request(Command::Shutdown).await
    }
}
