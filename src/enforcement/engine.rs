//! Enforcement engine
//!
//! Intercepts crafts and furnace interactions that would use a banned
//! material. Crafts are checked as they happen. Furnace interactions are
//! checked one tick later, once the host has moved the clicked stack into its
//! slot.

use crate::ERROR_TARGET;
use crate::enforcement::{
    CheckOutcome, EnforcementResult, PendingEnforcementCheck, TickScheduler, ViolationReport,
};
use crate::host::{
    Actor, ContainerId, ContainerInteraction, ContainerView, Containers, CraftAttempt,
    FurnaceSlot, ItemStack, Notifier,
};
use crate::registry::{BanQueryService, Purpose};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Purpose whose registry governs a furnace slot
#[must_use]
pub const fn slot_purpose(slot: FurnaceSlot) -> Purpose {
    match slot {
        FurnaceSlot::Smelting => Purpose::Smelting,
        FurnaceSlot::Fuel => Purpose::SmeltFueling,
    }
}

/// Interceptor for crafting and smelting actions
pub struct EnforcementEngine {
    queries: BanQueryService,
    containers: Arc<dyn Containers>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn TickScheduler>,
}

impl EnforcementEngine {
    pub fn new(
        queries: BanQueryService,
        containers: Arc<dyn Containers>,
        notifier: Arc<dyn Notifier>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Self {
        Self {
            queries,
            containers,
            notifier,
            scheduler,
        }
    }

    /// Cancel the craft if its result is banned from crafting. Returns
    /// whether the craft was cancelled.
    ///
    /// Nothing has entered the player's inventory yet, so cancelling is all
    /// the undo a craft needs.
    pub async fn on_craft(&self, attempt: &mut CraftAttempt) -> bool {
        if !self
            .queries
            .is_banned(Purpose::Crafting, &attempt.result.resource)
            .await
        {
            return false;
        }

        let display_name = self.queries.display_name(&attempt.result.resource);
        attempt.cancel();
        let report = ViolationReport::new(attempt.actor.clone(), Purpose::Crafting, display_name);
        report.deliver(self.notifier.as_ref()).await;
        true
    }

    /// Queue a furnace check for the next tick. Container contents are not
    /// inspected here because the host has not applied the click yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler refuses the check.
    pub fn on_container_interaction(
        &self,
        interaction: ContainerInteraction,
    ) -> EnforcementResult<()> {
        let container = interaction.container;
        self.scheduler
            .schedule_next_tick(PendingEnforcementCheck::from(interaction))
            .inspect_err(|e| {
                error!(
                    target: ERROR_TARGET,
                    container = %container,
                    error = %e,
                    "Failed to schedule furnace check"
                );
            })
    }

    /// Run a check queued by
    /// [`on_container_interaction`](Self::on_container_interaction).
    ///
    /// Slots are checked smelting first, then fuel. The first banned stack
    /// found is reverted and reported and the check ends there, so at most
    /// one violation is handled per check.
    pub async fn run_deferred(&self, check: PendingEnforcementCheck) -> CheckOutcome {
        let PendingEnforcementCheck {
            actor, container, ..
        } = check;

        if !self.containers.actor_present(actor.id) {
            debug!(actor = %actor.id, "Actor left before furnace check");
            return CheckOutcome::Stale;
        }
        let furnace = match self.containers.inspect(container) {
            Some(ContainerView::Furnace(furnace)) => furnace,
            Some(ContainerView::Other) => return CheckOutcome::NotFurnace,
            None => {
                debug!(container = %container, "Container vanished before furnace check");
                return CheckOutcome::Stale;
            }
        };

        for slot in FurnaceSlot::CHECK_ORDER {
            let Some(stack) = furnace.slot(slot) else {
                continue;
            };
            if self
                .queries
                .is_banned(slot_purpose(slot), &stack.resource)
                .await
            {
                return self.revert_and_report(&actor, container, slot).await;
            }
        }
        CheckOutcome::Clean
    }

    /// Move the slot's stack back to the actor, then report.
    ///
    /// The stack leaves the furnace before it reaches the player, so it is
    /// never in both places. A full inventory gets the stack dropped at the
    /// player's feet. Only if the host cannot do that either does it go back
    /// into the slot.
    async fn revert_and_report(
        &self,
        actor: &Actor,
        container: ContainerId,
        slot: FurnaceSlot,
    ) -> CheckOutcome {
        let Some(stack) = self.containers.take_stack(container, slot) else {
            return CheckOutcome::Stale;
        };
        let resource = stack.resource.clone();
        let purpose = slot_purpose(slot);

        let handed_back = self.containers.deposit(actor.id, stack).or_else(|refused| {
            debug!(
                actor = %actor.id,
                resource = %refused.resource,
                "Inventory refused banned stack; dropping it at the player"
            );
            self.containers.drop_near(actor.id, refused)
        });
        let outcome = match handed_back {
            Ok(()) => CheckOutcome::Reverted {
                slot,
                resource: resource.clone(),
            },
            Err(refused) => {
                warn!(
                    actor = %actor.id,
                    container = %container,
                    slot = %slot,
                    "Player could not take back banned stack; returning it to the furnace"
                );
                self.return_to_slot(container, slot, refused);
                CheckOutcome::RevertRefused {
                    slot,
                    resource: resource.clone(),
                }
            }
        };

        let report = ViolationReport::new(actor.clone(), purpose, self.queries.display_name(&resource));
        report.deliver(self.notifier.as_ref()).await;
        outcome
    }

    fn return_to_slot(&self, container: ContainerId, slot: FurnaceSlot, stack: ItemStack) {
        if let Err(stranded) = self.containers.restore_stack(container, slot, stack) {
            error!(
                target: ERROR_TARGET,
                container = %container,
                slot = %slot,
                resource = %stranded.resource,
                amount = stranded.amount,
                "Could not restore stack to the furnace slot it was taken from"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialCatalog;
    use crate::enforcement::{EnforcementError, MockTickScheduler};
    use crate::host::{ActorId, FurnaceView, MockContainers, MockNotifier};
    use crate::registry::{BanRegistryCollection, MemoryBanStore, ResourceId};
    use mockall::predicate::{always, eq};

    const FURNACE: ContainerId = ContainerId::new(7);

    fn steve() -> Actor {
        Actor::new(ActorId::new_random(), "Steve")
    }

    async fn queries(bans: &[(Purpose, &str)]) -> BanQueryService {
        let store = MemoryBanStore::new();
        for purpose in Purpose::ALL {
            let members = bans
                .iter()
                .filter(|(p, _)| *p == purpose)
                .map(|(_, name)| ResourceId::new(*name));
            store.seed(purpose, members);
        }
        let catalog = Arc::new(MaterialCatalog::vanilla());
        let registries =
            BanRegistryCollection::load(&Purpose::ALL, Arc::new(store), catalog.as_ref())
                .await
                .unwrap();
        BanQueryService::new(Arc::new(registries), catalog)
    }

    fn engine(
        queries: BanQueryService,
        containers: MockContainers,
        notifier: MockNotifier,
        scheduler: MockTickScheduler,
    ) -> EnforcementEngine {
        EnforcementEngine::new(
            queries,
            Arc::new(containers),
            Arc::new(notifier),
            Arc::new(scheduler),
        )
    }

    fn expect_one_report(notifier: &mut MockNotifier, player: &'static str, admin: &'static str) {
        notifier
            .expect_send_to_actor()
            .with(always(), eq(player))
            .times(1)
            .returning(|_, _| ());
        notifier
            .expect_broadcast_to_admins()
            .with(eq(admin))
            .times(1)
            .returning(|_| 1);
    }

    fn furnace(smelting: Option<(&str, u32)>, fuel: Option<(&str, u32)>) -> ContainerView {
        ContainerView::Furnace(FurnaceView {
            smelting: smelting.map(|(name, n)| ItemStack::new(ResourceId::new(name), n)),
            fuel: fuel.map(|(name, n)| ItemStack::new(ResourceId::new(name), n)),
        })
    }

    #[tokio::test]
    async fn test_banned_craft_is_cancelled_and_reported() {
        let mut notifier = MockNotifier::new();
        expect_one_report(&mut notifier, "You cannot craft Tnt!", "Steve tried to craft Tnt!");
        let engine = engine(
            queries(&[(Purpose::Crafting, "TNT")]).await,
            MockContainers::new(),
            notifier,
            MockTickScheduler::new(),
        );

        let mut attempt = CraftAttempt::new(steve(), ItemStack::new(ResourceId::new("TNT"), 1));
        assert!(engine.on_craft(&mut attempt).await);
        assert!(attempt.is_cancelled());
    }

    #[tokio::test]
    async fn test_allowed_craft_is_untouched() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send_to_actor().times(0);
        notifier.expect_broadcast_to_admins().times(0);
        let engine = engine(
            // banned for smelting only, so crafting it is fine
            queries(&[(Purpose::Smelting, "TNT")]).await,
            MockContainers::new(),
            notifier,
            MockTickScheduler::new(),
        );

        let mut attempt = CraftAttempt::new(steve(), ItemStack::new(ResourceId::new("TNT"), 1));
        assert!(!engine.on_craft(&mut attempt).await);
        assert!(!attempt.is_cancelled());
    }

    #[tokio::test]
    async fn test_interaction_only_schedules() {
        let mut containers = MockContainers::new();
        containers.expect_inspect().times(0);
        containers.expect_actor_present().times(0);
        let mut scheduler = MockTickScheduler::new();
        scheduler
            .expect_schedule_next_tick()
            .withf(|check| check.container == FURNACE && check.actor.name == "Steve")
            .times(1)
            .returning(|_| Ok(()));
        let engine = engine(
            queries(&[(Purpose::Smelting, "COAL")]).await,
            containers,
            MockNotifier::new(),
            scheduler,
        );

        engine
            .on_container_interaction(ContainerInteraction {
                actor: steve(),
                container: FURNACE,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_interaction_reports_scheduler_failure() {
        let mut scheduler = MockTickScheduler::new();
        scheduler
            .expect_schedule_next_tick()
            .returning(|_| Err(EnforcementError::SchedulerClosed));
        let engine = engine(
            queries(&[]).await,
            MockContainers::new(),
            MockNotifier::new(),
            scheduler,
        );

        let result = engine.on_container_interaction(ContainerInteraction {
            actor: steve(),
            container: FURNACE,
        });
        assert!(matches!(result, Err(EnforcementError::SchedulerClosed)));
    }

    #[tokio::test]
    async fn test_banned_smelting_slot_is_reverted() {
        let actor = steve();
        let actor_id = actor.id;

        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| true);
        containers
            .expect_inspect()
            .with(eq(FURNACE))
            .returning(|_| Some(furnace(Some(("COAL", 12)), Some(("LAVA_BUCKET", 1)))));
        containers
            .expect_take_stack()
            .with(eq(FURNACE), eq(FurnaceSlot::Smelting))
            .times(1)
            .returning(|_, _| Some(ItemStack::new(ResourceId::new("COAL"), 12)));
        containers
            .expect_deposit()
            .with(eq(actor_id), eq(ItemStack::new(ResourceId::new("COAL"), 12)))
            .times(1)
            .returning(|_, _| Ok(()));
        containers.expect_restore_stack().times(0);

        let mut notifier = MockNotifier::new();
        expect_one_report(&mut notifier, "You cannot smelt Coal!", "Steve tried to smelt Coal!");

        // both slots are banned; only the smelting slot is handled
        let engine = engine(
            queries(&[(Purpose::Smelting, "COAL"), (Purpose::SmeltFueling, "LAVA_BUCKET")]).await,
            containers,
            notifier,
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(actor, FURNACE))
            .await;
        assert_eq!(
            outcome,
            CheckOutcome::Reverted {
                slot: FurnaceSlot::Smelting,
                resource: ResourceId::new("COAL"),
            }
        );
    }

    #[tokio::test]
    async fn test_banned_fuel_slot_is_reverted() {
        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| true);
        containers
            .expect_inspect()
            .returning(|_| Some(furnace(Some(("IRON_ORE", 4)), Some(("COAL", 3)))));
        containers
            .expect_take_stack()
            .with(eq(FURNACE), eq(FurnaceSlot::Fuel))
            .times(1)
            .returning(|_, _| Some(ItemStack::new(ResourceId::new("COAL"), 3)));
        containers.expect_deposit().times(1).returning(|_, _| Ok(()));

        let mut notifier = MockNotifier::new();
        expect_one_report(
            &mut notifier,
            "You cannot fuel a furnace with Coal!",
            "Steve tried to fuel a furnace with Coal!",
        );

        // COAL is banned as fuel only; IRON_ORE may be smelted
        let engine = engine(
            queries(&[(Purpose::SmeltFueling, "COAL")]).await,
            containers,
            notifier,
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), FURNACE))
            .await;
        assert_eq!(
            outcome,
            CheckOutcome::Reverted {
                slot: FurnaceSlot::Fuel,
                resource: ResourceId::new("COAL"),
            }
        );
    }

    #[tokio::test]
    async fn test_full_inventory_drops_stack_at_player() {
        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| true);
        containers
            .expect_inspect()
            .returning(|_| Some(furnace(Some(("GOLD_ORE", 5)), None)));
        containers
            .expect_take_stack()
            .times(1)
            .returning(|_, _| Some(ItemStack::new(ResourceId::new("GOLD_ORE"), 5)));
        containers
            .expect_deposit()
            .times(1)
            .returning(|_, stack| Err(stack));
        containers
            .expect_drop_near()
            .with(always(), eq(ItemStack::new(ResourceId::new("GOLD_ORE"), 5)))
            .times(1)
            .returning(|_, _| Ok(()));
        containers.expect_restore_stack().times(0);

        let mut notifier = MockNotifier::new();
        expect_one_report(
            &mut notifier,
            "You cannot smelt Gold Ore!",
            "Steve tried to smelt Gold Ore!",
        );

        let engine = engine(
            queries(&[(Purpose::Smelting, "GOLD_ORE")]).await,
            containers,
            notifier,
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), FURNACE))
            .await;
        assert_eq!(
            outcome,
            CheckOutcome::Reverted {
                slot: FurnaceSlot::Smelting,
                resource: ResourceId::new("GOLD_ORE"),
            }
        );
    }

    #[tokio::test]
    async fn test_refused_deposit_and_drop_restores_slot() {
        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| true);
        containers
            .expect_inspect()
            .returning(|_| Some(furnace(Some(("GOLD_ORE", 5)), None)));
        containers
            .expect_take_stack()
            .times(1)
            .returning(|_, _| Some(ItemStack::new(ResourceId::new("GOLD_ORE"), 5)));
        containers
            .expect_deposit()
            .times(1)
            .returning(|_, stack| Err(stack));
        containers
            .expect_drop_near()
            .times(1)
            .returning(|_, stack| Err(stack));
        containers
            .expect_restore_stack()
            .with(
                eq(FURNACE),
                eq(FurnaceSlot::Smelting),
                eq(ItemStack::new(ResourceId::new("GOLD_ORE"), 5)),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut notifier = MockNotifier::new();
        expect_one_report(
            &mut notifier,
            "You cannot smelt Gold Ore!",
            "Steve tried to smelt Gold Ore!",
        );

        let engine = engine(
            queries(&[(Purpose::Smelting, "GOLD_ORE")]).await,
            containers,
            notifier,
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), FURNACE))
            .await;
        assert_eq!(
            outcome,
            CheckOutcome::RevertRefused {
                slot: FurnaceSlot::Smelting,
                resource: ResourceId::new("GOLD_ORE"),
            }
        );
    }

    #[tokio::test]
    async fn test_clean_furnace_does_nothing() {
        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| true);
        containers
            .expect_inspect()
            .returning(|_| Some(furnace(Some(("IRON_ORE", 4)), Some(("COAL", 3)))));
        containers.expect_take_stack().times(0);

        let mut notifier = MockNotifier::new();
        notifier.expect_send_to_actor().times(0);
        notifier.expect_broadcast_to_admins().times(0);

        let engine = engine(
            queries(&[(Purpose::Crafting, "COAL")]).await,
            containers,
            notifier,
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), FURNACE))
            .await;
        assert_eq!(outcome, CheckOutcome::Clean);
    }

    #[tokio::test]
    async fn test_stale_and_foreign_containers_are_noops() {
        let mut containers = MockContainers::new();
        containers
            .expect_actor_present()
            .returning(|_| true);
        containers
            .expect_inspect()
            .with(eq(ContainerId::new(1)))
            .returning(|_| None);
        containers
            .expect_inspect()
            .with(eq(ContainerId::new(2)))
            .returning(|_| Some(ContainerView::Other));
        containers.expect_take_stack().times(0);

        let engine = engine(
            queries(&[(Purpose::Smelting, "COAL")]).await,
            containers,
            MockNotifier::new(),
            MockTickScheduler::new(),
        );

        let gone = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), ContainerId::new(1)))
            .await;
        assert_eq!(gone, CheckOutcome::Stale);

        let chest = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), ContainerId::new(2)))
            .await;
        assert_eq!(chest, CheckOutcome::NotFurnace);
    }

    #[tokio::test]
    async fn test_departed_actor_is_a_noop() {
        let mut containers = MockContainers::new();
        containers.expect_actor_present().returning(|_| false);
        containers.expect_inspect().times(0);

        let engine = engine(
            queries(&[(Purpose::Smelting, "COAL")]).await,
            containers,
            MockNotifier::new(),
            MockTickScheduler::new(),
        );

        let outcome = engine
            .run_deferred(PendingEnforcementCheck::new(steve(), FURNACE))
            .await;
        assert_eq!(outcome, CheckOutcome::Stale);
        assert!(!outcome.is_violation());
    }
}
