//! Error types for the enforcement system

use thiserror::Error;

/// Errors that can occur while intercepting actions
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// The tick loop is gone, so deferred checks can no longer run
    #[error("Tick scheduler is closed")]
    SchedulerClosed,

    /// The tick loop's queue is full
    #[error("Tick scheduler queue is full (capacity {0})")]
    SchedulerFull(usize),
}

/// Result type for enforcement operations
pub type EnforcementResult<T> = Result<T, EnforcementError>;
