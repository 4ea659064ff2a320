use crate::host::ResourceCatalog;
use crate::registry::{BanRegistry, BanResult, BanStore, Purpose};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Every configured registry, keyed by purpose.
///
/// Built once during startup and shared read-only afterwards. Registries
/// mutate through their own interior lock, never by replacing entries here.
#[derive(Debug, Default)]
pub struct BanRegistryCollection {
    registries: HashMap<Purpose, BanRegistry>,
}

impl BanRegistryCollection {
    /// Load one registry per configured purpose
    ///
    /// # Errors
    ///
    /// Returns the first error raised while loading a purpose's record.
    pub async fn load(
        purposes: &[Purpose],
        store: Arc<dyn BanStore>,
        catalog: &dyn ResourceCatalog,
    ) -> BanResult<Self> {
        let mut registries = HashMap::with_capacity(purposes.len());
        for &purpose in purposes {
            if registries.contains_key(&purpose) {
                continue;
            }
            let registry = BanRegistry::load(purpose, Arc::clone(&store), catalog).await?;
            registries.insert(purpose, registry);
        }
        info!(registries = registries.len(), "Ban registries ready");
        Ok(Self { registries })
    }

    #[must_use]
    pub fn get(&self, purpose: Purpose) -> Option<&BanRegistry> {
        self.registries.get(&purpose)
    }

    /// Configured purposes in declaration order
    pub fn purposes(&self) -> impl Iterator<Item = Purpose> + '_ {
        Purpose::ALL
            .into_iter()
            .filter(|purpose| self.registries.contains_key(purpose))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}
