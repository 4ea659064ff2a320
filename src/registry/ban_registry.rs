//! Ban registry
//!
//! One registry holds the banned materials for one purpose and persists itself
//! after every change.

use crate::ERROR_TARGET;
use crate::host::ResourceCatalog;
use crate::registry::{BanResult, BanStore, Purpose, ResourceId};
use indexmap::IndexSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Persisted set of materials banned from one purpose
pub struct BanRegistry {
    purpose: Purpose,
    /// Insertion-ordered so listings are stable
    members: Mutex<IndexSet<ResourceId>>,
    store: Arc<dyn BanStore>,
}

impl std::fmt::Debug for BanRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanRegistry")
            .field("purpose", &self.purpose)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

impl BanRegistry {
    /// Create an empty registry backed by the given store
    pub fn new(purpose: Purpose, store: Arc<dyn BanStore>) -> Self {
        Self {
            purpose,
            members: Mutex::new(IndexSet::new()),
            store,
        }
    }

    /// Load a registry from its persisted record.
    ///
    /// Every entry is re-resolved through `catalog`, so hand-edited names are
    /// canonicalized and names the catalog no longer knows are dropped. If
    /// that changes the set, the cleaned record is written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot read the record.
    pub async fn load(
        purpose: Purpose,
        store: Arc<dyn BanStore>,
        catalog: &dyn ResourceCatalog,
    ) -> BanResult<Self> {
        let persisted = store.load(purpose).await?;
        let mut members = IndexSet::with_capacity(persisted.len());
        let mut rewritten = false;

        for entry in &persisted {
            match catalog.resolve(entry.as_str()) {
                Some(id) => {
                    rewritten |= id != *entry;
                    rewritten |= !members.insert(id);
                }
                None => {
                    warn!(
                        target: ERROR_TARGET,
                        purpose = %purpose,
                        entry = %entry,
                        "Dropping unknown material from persisted ban record"
                    );
                    rewritten = true;
                }
            }
        }
        info!(purpose = %purpose, count = members.len(), "Loaded ban registry");

        let registry = Self {
            purpose,
            members: Mutex::new(members),
            store,
        };
        if rewritten {
            let members = registry.members.lock().await;
            registry.persist(&members).await;
        }
        Ok(registry)
    }

    #[must_use]
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Ban a material. Returns `false` if it was already banned.
    pub async fn add(&self, id: ResourceId) -> bool {
        let mut members = self.members.lock().await;
        if !members.insert(id) {
            return false;
        }
        self.persist(&members).await;
        true
    }

    /// Unban a material. Returns `false` if it was not banned.
    pub async fn remove(&self, id: &ResourceId) -> bool {
        let mut members = self.members.lock().await;
        if !members.shift_remove(id) {
            return false;
        }
        self.persist(&members).await;
        true
    }

    pub async fn contains(&self, id: &ResourceId) -> bool {
        self.members.lock().await.contains(id)
    }

    /// Current members, oldest ban first
    pub async fn list(&self) -> Vec<ResourceId> {
        self.members.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }

    /// Write the set through to the store. The caller still holds the lock,
    /// so records are written in mutation order.
    async fn persist(&self, members: &IndexSet<ResourceId>) {
        let snapshot: Vec<ResourceId> = members.iter().cloned().collect();
        if let Err(e) = self.store.save(self.purpose, &snapshot).await {
            warn!(
                target: ERROR_TARGET,
                purpose = %self.purpose,
                error = %e,
                "Failed to persist ban registry; in-memory state remains authoritative"
            );
        }
    }
}
