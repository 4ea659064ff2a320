//! Enforcement of material bans
//!
//! This module intercepts crafting and furnace actions, reverts the ones that
//! use banned materials, and reports them to the player and administrators.

mod check;
mod engine;
mod error;
mod report;
mod scheduler;

pub use check::{CheckOutcome, PendingEnforcementCheck};
pub use engine::{EnforcementEngine, slot_purpose};
pub use error::{EnforcementError, EnforcementResult};
pub use report::ViolationReport;
#[cfg(test)]
pub use scheduler::MockTickScheduler;
pub use scheduler::{
    ChannelScheduler, QueuedScheduler, Tick, TickLoop, TickReceiver, TickRequest, TickScheduler,
};
