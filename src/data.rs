use std::{ops::Deref, sync::Arc};

use crate::ERROR_TARGET;
use crate::config::CraftBanConfig;
use crate::enforcement::{
    ChannelScheduler, EnforcementEngine, EnforcementResult, TickLoop, TickScheduler,
};
use crate::host::{Containers, Notifier, ResourceCatalog};
use crate::registry::{
    BanQueryService, BanRegistryCollection, BanResult, BanToggleService, YamlBanStore,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Centralized data structure for the plugin
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &self.config)
            .field("registries", &self.registries)
            .finish_non_exhaustive()
    }
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    /// Wire the services over already-loaded registries
    #[must_use]
    pub fn new(
        config: CraftBanConfig,
        registries: BanRegistryCollection,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> Self {
        Self(Arc::new(DataInner::new(config, registries, catalog)))
    }

    /// Load every configured registry from YAML files under `config.data_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if a ban record exists but cannot be read or parsed.
    pub async fn load(config: CraftBanConfig, catalog: Arc<dyn ResourceCatalog>) -> BanResult<Self> {
        let store = Arc::new(YamlBanStore::new(&config.data_dir));
        let registries =
            BanRegistryCollection::load(&config.purposes, store, catalog.as_ref()).await?;
        info!(
            data_dir = %config.data_dir.display(),
            registries = registries.len(),
            "Loaded ban registries"
        );
        Ok(Self::new(config, registries, catalog))
    }

    /// Build an enforcement engine over this data's registries
    #[must_use]
    pub fn engine(
        &self,
        containers: Arc<dyn Containers>,
        notifier: Arc<dyn Notifier>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> EnforcementEngine {
        EnforcementEngine::new(self.queries.clone(), containers, notifier, scheduler)
    }

    /// Start enforcement on a tokio tick loop sized and paced by the config,
    /// for hosts that do not drive ticks themselves
    #[must_use]
    pub fn spawn_tick_loop(
        &self,
        containers: Arc<dyn Containers>,
        notifier: Arc<dyn Notifier>,
    ) -> TickLoopHandle {
        let (scheduler, receiver) = ChannelScheduler::channel(self.config.scheduler_capacity);
        let scheduler = Arc::new(scheduler);
        let engine = Arc::new(self.engine(containers, notifier, scheduler.clone()));
        let task = TickLoop::new(Arc::clone(&engine), receiver, self.config.tick_interval()).spawn();
        TickLoopHandle {
            engine,
            scheduler,
            task,
        }
    }
}

/// A running tick loop and the engine feeding it
pub struct TickLoopHandle {
    pub engine: Arc<EnforcementEngine>,
    pub scheduler: Arc<ChannelScheduler>,
    task: JoinHandle<()>,
}

impl TickLoopHandle {
    /// Stop the loop and wait for it to exit
    ///
    /// # Errors
    ///
    /// Returns `EnforcementError::SchedulerClosed` if the loop already stopped.
    pub async fn shutdown(self) -> EnforcementResult<()> {
        self.scheduler.shutdown().await?;
        if let Err(e) = self.task.await {
            error!(target: ERROR_TARGET, error = %e, "Tick loop task failed");
        }
        Ok(())
    }
}

/// Main centralized data structure for the plugin
pub struct DataInner {
    pub config: CraftBanConfig,
    // One registry per configured purpose, fixed after startup
    pub registries: Arc<BanRegistryCollection>,
    pub catalog: Arc<dyn ResourceCatalog>,
    pub toggles: BanToggleService,
    pub queries: BanQueryService,
}

impl DataInner {
    #[must_use]
    pub fn new(
        config: CraftBanConfig,
        registries: BanRegistryCollection,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> Self {
        let registries = Arc::new(registries);
        Self {
            config,
            toggles: BanToggleService::new(Arc::clone(&registries), Arc::clone(&catalog)),
            queries: BanQueryService::new(Arc::clone(&registries), Arc::clone(&catalog)),
            registries,
            catalog,
        }
    }
}
