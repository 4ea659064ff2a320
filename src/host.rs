//! Host game server interfaces
//!
//! The server owns the material catalog, the containers and the players. This
//! module declares the capabilities the ban layer needs from it and the event
//! shapes it receives.

use crate::registry::ResourceId;
use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player identity as assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
pub struct ActorId(Uuid);

impl ActorId {
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A player taking part in an intercepted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Handle to a block container (furnace, chest, ...) in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
pub struct ContainerId(u64);

impl ContainerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A quantity of one material occupying a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub resource: ResourceId,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(resource: impl Into<ResourceId>, amount: u32) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

/// The two independently-filled furnace inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FurnaceSlot {
    /// The material being processed
    Smelting,
    /// The material being burned
    Fuel,
}

impl FurnaceSlot {
    /// Order in which a deferred check inspects the slots
    pub const CHECK_ORDER: [Self; 2] = [Self::Smelting, Self::Fuel];
}

impl std::fmt::Display for FurnaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smelting => write!(f, "smelting"),
            Self::Fuel => write!(f, "fuel"),
        }
    }
}

/// Snapshot of a furnace's input slots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FurnaceView {
    pub smelting: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
}

impl FurnaceView {
    #[must_use]
    pub fn slot(&self, slot: FurnaceSlot) -> Option<&ItemStack> {
        match slot {
            FurnaceSlot::Smelting => self.smelting.as_ref(),
            FurnaceSlot::Fuel => self.fuel.as_ref(),
        }
    }
}

/// What a container currently is, as seen at inspection time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerView {
    Furnace(FurnaceView),
    Other,
}

/// Material lookup provided by the host
#[cfg_attr(test, mockall::automock)]
pub trait ResourceCatalog: Send + Sync {
    /// Match free text to a material, `None` if nothing matches
    fn resolve(&self, name: &str) -> Option<ResourceId>;

    /// Human-readable name for reports
    fn display_name(&self, id: &ResourceId) -> String;
}

/// Container and inventory access provided by the host.
///
/// All calls happen on the host's tick thread, so a value read by one call is
/// still current for the next call in the same check.
#[cfg_attr(test, mockall::automock)]
pub trait Containers: Send + Sync {
    /// Inspect a container; `None` if it no longer exists
    fn inspect(&self, container: ContainerId) -> Option<ContainerView>;

    /// Remove and return the stack in a furnace slot
    fn take_stack(&self, container: ContainerId, slot: FurnaceSlot) -> Option<ItemStack>;

    /// Put a stack back into a furnace slot, handing it back if it cannot
    fn restore_stack(
        &self,
        container: ContainerId,
        slot: FurnaceSlot,
        stack: ItemStack,
    ) -> Result<(), ItemStack>;

    /// Move a stack into a player's personal inventory, handing it back if
    /// the player is gone or has no room
    fn deposit(&self, actor: ActorId, stack: ItemStack) -> Result<(), ItemStack>;

    /// Drop a stack on the ground at a player's position, handing it back if
    /// the host cannot
    fn drop_near(&self, actor: ActorId, stack: ItemStack) -> Result<(), ItemStack>;

    /// Whether the player is still connected
    fn actor_present(&self, actor: ActorId) -> bool;
}

/// Message delivery provided by the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message to one player
    async fn send_to_actor(&self, actor: ActorId, message: &str);

    /// Deliver a message to every connected administrator, returning how many
    /// received it
    async fn broadcast_to_admins(&self, message: &str) -> usize;
}

/// A player is about to take the result out of a crafting grid
#[derive(Debug, Clone)]
pub struct CraftAttempt {
    pub actor: Actor,
    pub result: ItemStack,
    cancelled: bool,
}

impl CraftAttempt {
    #[must_use]
    pub fn new(actor: Actor, result: ItemStack) -> Self {
        Self {
            actor,
            result,
            cancelled: false,
        }
    }

    /// Prevent the craft from taking effect
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A player clicked inside an open container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInteraction {
    pub actor: Actor,
    pub container: ContainerId,
}
