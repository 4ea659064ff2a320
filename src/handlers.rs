use crate::EVENT_TARGET;
use crate::enforcement::EnforcementEngine;
use crate::host::{ContainerInteraction, CraftAttempt};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Host events the plugin subscribes to
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called before a crafted item is handed to the player
    async fn craft_attempted(&self, attempt: &mut CraftAttempt);

    /// Called when a player clicks inside an open container
    async fn container_interaction(&self, interaction: ContainerInteraction);
}

pub struct Handler {
    engine: Arc<EnforcementEngine>,
}

impl Handler {
    pub fn new(engine: Arc<EnforcementEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn craft_attempted(&self, attempt: &mut CraftAttempt) {
        if self.engine.on_craft(attempt).await {
            info!(
                target: EVENT_TARGET,
                actor = %attempt.actor.name,
                resource = %attempt.result.resource,
                "Craft cancelled"
            );
        }
    }

    async fn container_interaction(&self, interaction: ContainerInteraction) {
        debug!(
            target: EVENT_TARGET,
            actor = %interaction.actor.name,
            container = %interaction.container,
            "Container interaction"
        );
        // Scheduling failures are logged by the engine; the click itself
        // is never blocked
        let _ = self.engine.on_container_interaction(interaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialCatalog;
    use crate::enforcement::{MockTickScheduler, PendingEnforcementCheck};
    use crate::host::{
        Actor, ActorId, ContainerId, ItemStack, MockContainers, MockNotifier, ResourceCatalog,
    };
    use crate::registry::{
        BanQueryService, BanRegistryCollection, MemoryBanStore, Purpose, ResourceId,
    };

    async fn engine_with(
        crafting_bans: &[&str],
        notifier: MockNotifier,
        scheduler: MockTickScheduler,
    ) -> Arc<EnforcementEngine> {
        let store = MemoryBanStore::new();
        store.seed(
            Purpose::Crafting,
            crafting_bans.iter().map(|name| ResourceId::new(*name)),
        );
        let catalog: Arc<dyn ResourceCatalog> = Arc::new(MaterialCatalog::vanilla());
        let registries =
            BanRegistryCollection::load(&Purpose::ALL, Arc::new(store), catalog.as_ref())
                .await
                .unwrap();
        let queries = BanQueryService::new(Arc::new(registries), catalog);
        Arc::new(EnforcementEngine::new(
            queries,
            Arc::new(MockContainers::new()),
            Arc::new(notifier),
            Arc::new(scheduler),
        ))
    }

    #[tokio::test]
    async fn test_banned_craft_is_cancelled() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send_to_actor().times(1).return_const(());
        notifier.expect_broadcast_to_admins().times(1).return_const(0usize);
        let handler = Handler::new(engine_with(&["TNT"], notifier, MockTickScheduler::new()).await);

        let mut attempt = CraftAttempt::new(
            Actor::new(ActorId::new_random(), "Alex"),
            ItemStack::new(ResourceId::new("TNT"), 1),
        );
        handler.craft_attempted(&mut attempt).await;
        assert!(attempt.is_cancelled());
    }

    #[tokio::test]
    async fn test_allowed_craft_passes() {
        let handler =
            Handler::new(engine_with(&["TNT"], MockNotifier::new(), MockTickScheduler::new()).await);

        let mut attempt = CraftAttempt::new(
            Actor::new(ActorId::new_random(), "Alex"),
            ItemStack::new(ResourceId::new("SAND"), 4),
        );
        handler.craft_attempted(&mut attempt).await;
        assert!(!attempt.is_cancelled());
    }

    #[tokio::test]
    async fn test_container_interaction_is_deferred() {
        let mut scheduler = MockTickScheduler::new();
        scheduler
            .expect_schedule_next_tick()
            .times(1)
            .returning(|check: PendingEnforcementCheck| {
                assert_eq!(check.container, ContainerId::new(3));
                Ok(())
            });
        let handler = Handler::new(engine_with(&[], MockNotifier::new(), scheduler).await);

        handler
            .container_interaction(ContainerInteraction {
                actor: Actor::new(ActorId::new_random(), "Alex"),
                container: ContainerId::new(3),
            })
            .await;
    }
}
