//! Plugin configuration
//!
//! Loaded once at startup from a YAML file. Every field has a default, so a
//! missing file or a partial file is fine.

use crate::registry::{BanError, BanResult, Purpose};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default location of the config file
pub const CONFIG_FILE: &str = "config/craftban.yaml";
/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CRAFTBAN_CONFIG";
/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "CRAFTBAN_DATA_DIR";

/// Configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftBanConfig {
    /// Directory holding one ban record per purpose
    pub data_dir: PathBuf,
    /// Directory for rotated log files
    pub log_dir: PathBuf,
    /// Purposes that get a registry
    pub purposes: Vec<Purpose>,
    /// Length of one host tick in milliseconds
    pub tick_interval_ms: u64,
    /// How many deferred checks may wait for the next tick
    pub scheduler_capacity: usize,
    /// Extra material names accepted by the console catalog
    pub materials: Vec<String>,
}

impl Default for CraftBanConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            purposes: Purpose::ALL.to_vec(),
            tick_interval_ms: 50,
            scheduler_capacity: 256,
            materials: Vec::new(),
        }
    }
}

impl CraftBanConfig {
    /// Load from `$CRAFTBAN_CONFIG`, or [`CONFIG_FILE`] if unset
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the result is invalid.
    pub async fn load() -> BanResult<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::load_from(Path::new(&path)).await?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> BanResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let config: Self = serde_yaml::from_str(&content)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Reject settings the plugin cannot run with, and drop repeated purposes
    ///
    /// # Errors
    ///
    /// Returns `BanError::Config` describing the first problem found.
    pub fn validate(&mut self) -> BanResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(BanError::Config("tick_interval_ms must be positive".to_string()));
        }
        if self.scheduler_capacity == 0 {
            return Err(BanError::Config(
                "scheduler_capacity must be positive".to_string(),
            ));
        }
        let mut seen = Vec::with_capacity(self.purposes.len());
        self.purposes.retain(|purpose| {
            if seen.contains(purpose) {
                false
            } else {
                seen.push(*purpose);
                true
            }
        });
        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
