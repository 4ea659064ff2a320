//! Ban toggling
//!
//! Flipping a material's ban state for a purpose, as driven by the ban
//! commands.

use crate::host::ResourceCatalog;
use crate::registry::{BanError, BanRegistryCollection, BanResult, Purpose, ResourceId};
use std::sync::Arc;
use tracing::info;

/// Result of a toggle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The name did not resolve to a material; nothing changed
    Invalid,
    /// The material was not banned and now is
    Banned(ResourceId),
    /// The material was banned and no longer is
    Unbanned(ResourceId),
}

/// Service that flips ban membership
#[derive(Clone)]
pub struct BanToggleService {
    registries: Arc<BanRegistryCollection>,
    catalog: Arc<dyn ResourceCatalog>,
}

impl BanToggleService {
    pub fn new(registries: Arc<BanRegistryCollection>, catalog: Arc<dyn ResourceCatalog>) -> Self {
        Self {
            registries,
            catalog,
        }
    }

    /// Unban the named material if it is banned for `purpose`, otherwise ban
    /// it. Two consecutive calls with the same arguments cancel out.
    ///
    /// # Errors
    ///
    /// Returns `BanError::RegistryNotConfigured` if no registry backs
    /// `purpose`. That means the command table and the configured purposes
    /// disagree, and is not a user mistake.
    pub async fn toggle(&self, purpose: Purpose, raw_name: &str) -> BanResult<ToggleOutcome> {
        let Some(id) = self.catalog.resolve(raw_name) else {
            return Ok(ToggleOutcome::Invalid);
        };

        let registry = self
            .registries
            .get(purpose)
            .ok_or(BanError::RegistryNotConfigured(purpose))?;

        let outcome = if registry.remove(&id).await {
            ToggleOutcome::Unbanned(id)
        } else {
            // add() only reports false if a racing toggle banned it first;
            // the material is banned either way
            registry.add(id.clone()).await;
            ToggleOutcome::Banned(id)
        };

        info!(purpose = %purpose, outcome = ?outcome, "Toggled material ban");
        Ok(outcome)
    }
}
