//! Banned-material registries
//!
//! This module holds the per-purpose sets of banned materials, their
//! persistence, and the toggle and query services built on top of them.

mod ban_registry;
mod collection;
mod error;
mod purpose;
mod query;
mod resource;
mod store;
mod toggle;

pub use ban_registry::BanRegistry;
pub use collection::BanRegistryCollection;
pub use error::{BanError, BanResult};
pub use purpose::Purpose;
pub use query::BanQueryService;
pub use resource::ResourceId;
#[cfg(test)]
pub use store::MockBanStore;
pub use store::{BanStore, MemoryBanStore, YamlBanStore};
pub use toggle::{BanToggleService, ToggleOutcome};
