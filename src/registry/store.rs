//! Ban registry persistence
//!
//! This module provides the storage backends registries load from and persist
//! to. A registry only sees "load this purpose" and "save this purpose".

use crate::registry::{BanResult, Purpose, ResourceId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Backing storage for the per-purpose member sets
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BanStore: Send + Sync {
    /// Load the members persisted for a purpose. A purpose that was never
    /// saved loads as an empty list.
    async fn load(&self, purpose: Purpose) -> BanResult<Vec<ResourceId>>;

    /// Replace the persisted members for a purpose
    async fn save(&self, purpose: Purpose, members: &[ResourceId]) -> BanResult<()>;
}

/// On-disk layout of one purpose's record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BanFile {
    purpose: Purpose,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    materials: Vec<ResourceId>,
}

/// Stores each purpose as `<dir>/<purpose>.yaml`
#[derive(Debug, Clone)]
pub struct YamlBanStore {
    dir: PathBuf,
}

impl YamlBanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record backing a purpose
    #[must_use]
    pub fn path_for(&self, purpose: Purpose) -> PathBuf {
        self.dir.join(format!("{purpose}.yaml"))
    }
}

#[async_trait]
impl BanStore for YamlBanStore {
    async fn load(&self, purpose: Purpose) -> BanResult<Vec<ResourceId>> {
        let path = self.path_for(purpose);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let file: BanFile = serde_yaml::from_str(&content)?;
        if file.purpose != purpose {
            warn!(
                path = %path.display(),
                expected = %purpose,
                found = %file.purpose,
                "Ban record purpose does not match its file name; using file name"
            );
        }
        Ok(file.materials)
    }

    async fn save(&self, purpose: Purpose, members: &[ResourceId]) -> BanResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file = BanFile {
            purpose,
            updated_at: Utc::now(),
            materials: members.to_vec(),
        };
        let yaml = serde_yaml::to_string(&file)?;

        // Write beside the target and rename so a crash never leaves a torn record
        let path = self.path_for(purpose);
        let tmp = path.with_extension("yaml.tmp");
        tokio::fs::write(&tmp, yaml).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Process-local store, for hosts without durable storage and for tests
#[derive(Clone, Default)]
pub struct MemoryBanStore {
    records: Arc<DashMap<Purpose, Vec<ResourceId>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryBanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a purpose's record, as if it had been saved earlier
    pub fn seed(&self, purpose: Purpose, members: impl IntoIterator<Item = ResourceId>) {
        self.records.insert(purpose, members.into_iter().collect());
    }

    /// Current record for a purpose, if one was ever saved or seeded
    #[must_use]
    pub fn snapshot(&self, purpose: Purpose) -> Option<Vec<ResourceId>> {
        self.records.get(&purpose).map(|entry| entry.value().clone())
    }

    /// Make every subsequent save fail until switched back
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BanStore for MemoryBanStore {
    async fn load(&self, purpose: Purpose) -> BanResult<Vec<ResourceId>> {
        Ok(self.snapshot(purpose).unwrap_or_default())
    }

    async fn save(&self, purpose: Purpose, members: &[ResourceId]) -> BanResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("memory store is failing saves").into());
        }
        self.records.insert(purpose, members.to_vec());
        Ok(())
    }
}
