use crate::enforcement::Tick;
use crate::host::{Actor, ContainerId, ContainerInteraction, FurnaceSlot};
use crate::registry::ResourceId;

/// A container interaction waiting to be re-examined on the next tick.
///
/// Running a check consumes it, so a check can only run once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEnforcementCheck {
    pub actor: Actor,
    pub container: ContainerId,
    /// Tick during which the interaction was observed, if the scheduler
    /// tracks ticks
    pub observed_at: Option<Tick>,
}

impl PendingEnforcementCheck {
    #[must_use]
    pub fn new(actor: Actor, container: ContainerId) -> Self {
        Self {
            actor,
            container,
            observed_at: None,
        }
    }

    #[must_use]
    pub fn observed_at(mut self, tick: Tick) -> Self {
        self.observed_at = Some(tick);
        self
    }
}

impl From<ContainerInteraction> for PendingEnforcementCheck {
    fn from(interaction: ContainerInteraction) -> Self {
        Self::new(interaction.actor, interaction.container)
    }
}

/// What a deferred check found and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The actor or container vanished before the check ran
    Stale,
    /// The container is not a furnace
    NotFurnace,
    /// Nothing banned in either slot
    Clean,
    /// A banned stack was moved back to the actor
    Reverted {
        slot: FurnaceSlot,
        resource: ResourceId,
    },
    /// A banned stack was found but the actor could not take it, so it was
    /// put back where it was
    RevertRefused {
        slot: FurnaceSlot,
        resource: ResourceId,
    },
}

impl CheckOutcome {
    /// Whether the check found a banned stack
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Reverted { .. } | Self::RevertRefused { .. })
    }
}
