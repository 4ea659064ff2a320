use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Canonical name of a game material, e.g. `COAL` or `IRON_ORE`.
///
/// Only a [`ResourceCatalog`](crate::host::ResourceCatalog) should mint these
/// from user input; the registry assumes every id it sees was resolved.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
