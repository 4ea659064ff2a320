//! Error types for the ban registry
//!
//! This module defines the errors that can occur while loading, persisting or
//! mutating banned-material registries.

use crate::registry::Purpose;
use thiserror::Error;

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum BanError {
    /// A command was routed to a purpose that has no backing registry
    #[error("No ban registry configured for purpose: {0}")]
    RegistryNotConfigured(Purpose),

    /// Reading or writing a persisted record failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record or config file could not be (de)serialized
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is present but unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for registry operations
pub type BanResult<T> = Result<T, BanError>;
