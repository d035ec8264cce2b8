//! Client-side entity stores.
//!
//! Each store caches one remote collection and reconciles fetch/create
//! results into a snapshot:
//!
//! ```text
//!            fetch_all()              ok: replace snapshot
//!  Empty ───────────────► Loading ─────────────────────► Ready
//!  Ready ───────────────►    │
//!  Failed ──────────────►    └──── err: keep snapshot ──► Failed
//!
//!  create(): status untouched; ok appends, err leaves snapshot as is
//! ```
//!
//! Concurrent fetches are not deduplicated. Whichever response resolves last
//! determines the final snapshot, and a fetch may drop a record appended by a
//! create that resolved before it.

mod context;

pub use context::*;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::client::{CollectionClient, NetworkResult};
use crate::models::{Entity, EntityId, Patient, Prescription};

/// Lifecycle of a store's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// Nothing fetched yet
    Empty,
    /// A fetch-all is in flight
    Loading,
    /// Last fetch-all succeeded
    Ready,
    /// Last fetch-all failed; the previous snapshot is kept
    Failed,
}

/// Everything a view needs to render one collection.
#[derive(Debug, Clone)]
pub struct StoreState<E> {
    pub status: StoreStatus,
    /// Ordered records, shared with readers without copying
    pub items: Arc<Vec<E>>,
    /// Message of the most recent failed fetch, cleared on success
    pub last_error: Option<String>,
    /// Incremented on every state change
    pub revision: u64,
}

impl<E> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            status: StoreStatus::Empty,
            items: Arc::new(Vec::new()),
            last_error: None,
            revision: 0,
        }
    }
}

/// Cached copy of one remote collection.
pub struct EntityStore<E: Entity> {
    client: Arc<dyn CollectionClient<E>>,
    state: watch::Sender<StoreState<E>>,
}

pub type PatientStore = EntityStore<Patient>;
pub type PrescriptionStore = EntityStore<Prescription>;

impl<E: Entity> EntityStore<E> {
    /// Create an empty store backed by `client`.
    pub fn new(client: Arc<dyn CollectionClient<E>>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { client, state }
    }

    /// Current records.
    pub fn snapshot(&self) -> Arc<Vec<E>> {
        Arc::clone(&self.state.borrow().items)
    }

    pub fn status(&self) -> StoreStatus {
        self.state.borrow().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Full state (status, items, error, revision) at this instant.
    pub fn state(&self) -> StoreState<E> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<E>> {
        self.state.subscribe()
    }

    /// Look up a record in the current snapshot.
    pub fn find(&self, id: EntityId) -> Option<E> {
        self.state.borrow().items.iter().find(|e| e.id() == id).cloned()
    }

    /// Replace the snapshot with the server's collection.
    ///
    /// On failure the status becomes `Failed`, the previous snapshot is kept
    /// and the error is returned.
    pub async fn fetch_all(&self) -> NetworkResult<Arc<Vec<E>>> {
        self.state.send_modify(|s| {
            s.status = StoreStatus::Loading;
            s.revision += 1;
        });
        tracing::debug!("Fetching {}", E::RESOURCE);

        match self.client.fetch_all().await {
            Ok(items) => {
                warn_on_duplicate_ids(&items);
                tracing::info!("Fetched {} {}", items.len(), E::RESOURCE);
                let items = Arc::new(items);
                self.state.send_modify(|s| {
                    s.status = StoreStatus::Ready;
                    s.items = Arc::clone(&items);
                    s.last_error = None;
                    s.revision += 1;
                });
                Ok(items)
            }
            Err(e) => {
                tracing::warn!("Fetching {} failed: {}", E::RESOURCE, e);
                self.state.send_modify(|s| {
                    s.status = StoreStatus::Failed;
                    s.last_error = Some(e.to_string());
                    s.revision += 1;
                });
                Err(e)
            }
        }
    }

    /// Create a record remotely and append the server's copy.
    ///
    /// The status is left alone. Errors are returned for the caller to show.
    pub async fn create(&self, draft: &E::Draft) -> NetworkResult<E> {
        tracing::debug!("Creating {}: {:?}", E::RESOURCE, draft);

        let created = self.client.create(draft).await.map_err(|e| {
            tracing::warn!("Creating {} failed: {}", E::RESOURCE, e);
            e
        })?;

        self.state.send_modify(|s| {
            if s.items.iter().any(|e| e.id() == created.id()) {
                tracing::warn!("{} already holds id {}", E::RESOURCE, created.id());
            }
            Arc::make_mut(&mut s.items).push(created.clone());
            s.revision += 1;
        });
        tracing::info!("Created {} {}", E::RESOURCE, created.id());
        Ok(created)
    }
}

fn warn_on_duplicate_ids<E: Entity>(items: &[E]) {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            tracing::warn!("Server returned duplicate {} id {}", E::RESOURCE, item.id());
        }
    }
}

impl PrescriptionStore {
    /// Prescriptions of one patient from the current snapshot.
    pub fn for_patient(&self, patient_id: EntityId) -> Vec<Prescription> {
        self.state
            .borrow()
            .items
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect()
    }
}
