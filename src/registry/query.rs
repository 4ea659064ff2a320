use crate::host::ResourceCatalog;
use crate::registry::{BanRegistryCollection, Purpose, ResourceId};
use std::sync::Arc;

/// Read-only ban lookups for reports and enforcement
#[derive(Clone)]
pub struct BanQueryService {
    registries: Arc<BanRegistryCollection>,
    catalog: Arc<dyn ResourceCatalog>,
}

impl BanQueryService {
    pub fn new(registries: Arc<BanRegistryCollection>, catalog: Arc<dyn ResourceCatalog>) -> Self {
        Self {
            registries,
            catalog,
        }
    }

    /// Whether `id` is banned for `purpose`. A purpose without a registry
    /// bans nothing.
    pub async fn is_banned(&self, purpose: Purpose, id: &ResourceId) -> bool {
        match self.registries.get(purpose) {
            Some(registry) => registry.contains(id).await,
            None => false,
        }
    }

    /// Free-text variant of [`is_banned`](Self::is_banned); a name that does
    /// not resolve is reported as not banned
    pub async fn is_banned_name(&self, purpose: Purpose, raw_name: &str) -> bool {
        match self.catalog.resolve(raw_name) {
            Some(id) => self.is_banned(purpose, &id).await,
            None => false,
        }
    }

    /// Display names of the materials banned for `purpose`, oldest ban first.
    /// `None` if no registry backs the purpose.
    pub async fn describe(&self, purpose: Purpose) -> Option<Vec<String>> {
        let registry = self.registries.get(purpose)?;
        let names = registry
            .list()
            .await
            .iter()
            .map(|id| self.catalog.display_name(id))
            .collect();
        Some(names)
    }

    /// Display name of a single material
    #[must_use]
    pub fn display_name(&self, id: &ResourceId) -> String {
        self.catalog.display_name(id)
    }
}
