//! Deferred-check scheduling
//!
//! Furnace slots are filled one tick after the click that fills them, so the
//! engine hands interaction checks to a scheduler that runs them on the next
//! tick boundary, never in the tick the click arrived.

use crate::enforcement::{
    CheckOutcome, EnforcementEngine, EnforcementError, EnforcementResult, PendingEnforcementCheck,
};
use derive_more::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Host tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Accepts checks that must run on the tick after the current one
#[cfg_attr(test, mockall::automock)]
pub trait TickScheduler: Send + Sync {
    /// Queue a check for the next tick and return immediately
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler can no longer accept checks.
    fn schedule_next_tick(&self, check: PendingEnforcementCheck) -> EnforcementResult<()>;
}

#[derive(Debug, Default)]
struct QueueState {
    tick: Tick,
    queued: Vec<PendingEnforcementCheck>,
}

/// Scheduler for hosts that drive their own tick loop.
///
/// The host calls [`begin_tick`](Self::begin_tick) (or
/// [`run_tick`](Self::run_tick)) once per tick; it receives exactly the
/// checks queued during the previous tick.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    state: Mutex<QueueState>,
}

impl QueuedScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_tick(&self) -> Tick {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).tick
    }

    /// Checks waiting for the next tick
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queued
            .len()
    }

    /// Advance to the next tick and take every check that is now due
    pub fn begin_tick(&self) -> (Tick, Vec<PendingEnforcementCheck>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.tick = state.tick.next();
        (state.tick, std::mem::take(&mut state.queued))
    }

    /// Advance one tick and run the due checks against `engine`. Checks
    /// scheduled while these run wait for the following tick.
    pub async fn run_tick(&self, engine: &EnforcementEngine) -> Vec<CheckOutcome> {
        let (tick, due) = self.begin_tick();
        if !due.is_empty() {
            debug!(tick = %tick, checks = due.len(), "Running deferred checks");
        }
        let mut outcomes = Vec::with_capacity(due.len());
        for check in due {
            outcomes.push(engine.run_deferred(check).await);
        }
        outcomes
    }
}

impl TickScheduler for QueuedScheduler {
    fn schedule_next_tick(&self, check: PendingEnforcementCheck) -> EnforcementResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = state.tick;
        state.queued.push(check.observed_at(tick));
        Ok(())
    }
}

/// Request type for the tick loop
#[derive(Debug, Clone)]
pub enum TickRequest {
    /// Run this check on the next tick
    Check(PendingEnforcementCheck),
    /// Stop the tick loop
    Shutdown,
}

/// Sending side of a [`TickLoop`]
#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    tx: Sender<TickRequest>,
    clock: Arc<AtomicU64>,
    capacity: usize,
}

/// Receiving side handed to [`TickLoop::new`]
#[derive(Debug)]
pub struct TickReceiver {
    rx: Receiver<TickRequest>,
    clock: Arc<AtomicU64>,
}

impl ChannelScheduler {
    /// Create a scheduler and the receiver its tick loop will drain
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, TickReceiver) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let clock = Arc::new(AtomicU64::new(0));
        (
            Self {
                tx,
                clock: Arc::clone(&clock),
                capacity,
            },
            TickReceiver { rx, clock },
        )
    }

    /// Tick most recently started by the loop
    #[must_use]
    pub fn current_tick(&self) -> Tick {
        Tick(self.clock.load(Ordering::Acquire))
    }

    /// Ask the tick loop to stop after the request currently being handled
    ///
    /// # Errors
    ///
    /// Returns `EnforcementError::SchedulerClosed` if the loop already stopped.
    pub async fn shutdown(&self) -> EnforcementResult<()> {
        self.tx
            .send(TickRequest::Shutdown)
            .await
            .map_err(|_| EnforcementError::SchedulerClosed)
    }
}

impl TickScheduler for ChannelScheduler {
    fn schedule_next_tick(&self, check: PendingEnforcementCheck) -> EnforcementResult<()> {
        let check = check.observed_at(self.current_tick());
        self.tx
            .try_send(TickRequest::Check(check))
            .map_err(|e| match e {
                TrySendError::Full(_) => EnforcementError::SchedulerFull(self.capacity),
                TrySendError::Closed(_) => EnforcementError::SchedulerClosed,
            })
    }
}

/// Tokio task that stands in for the host's tick loop
pub struct TickLoop {
    engine: Arc<EnforcementEngine>,
    receiver: TickReceiver,
    period: Duration,
}

impl TickLoop {
    #[must_use]
    pub fn new(engine: Arc<EnforcementEngine>, receiver: TickReceiver, period: Duration) -> Self {
        Self {
            engine,
            receiver,
            period,
        }
    }

    /// Spawn the loop onto the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Collect checks as they arrive and run them when the next tick fires
    pub async fn run(mut self) {
        let period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX);
        info!("Starting enforcement tick loop with {period_ms}ms period");

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut queued: Vec<PendingEnforcementCheck> = Vec::new();

        loop {
            tokio::select! {
                request = self.receiver.rx.recv() => match request {
                    Some(TickRequest::Check(check)) => queued.push(check),
                    Some(TickRequest::Shutdown) => {
                        info!("Received shutdown request for tick loop");
                        break;
                    }
                    None => {
                        info!("All tick schedulers dropped");
                        break;
                    }
                },

                _ = interval.tick() => {
                    let tick = Tick(self.receiver.clock.fetch_add(1, Ordering::AcqRel) + 1);
                    let due = std::mem::take(&mut queued);
                    if !due.is_empty() {
                        debug!(tick = %tick, checks = due.len(), "Running deferred checks");
                    }
                    for check in due {
                        let outcome = self.engine.run_deferred(check).await;
                        debug!(tick = %tick, outcome = ?outcome, "Deferred check finished");
                    }
                }
            }
        }

        if !queued.is_empty() {
            info!(dropped = queued.len(), "Tick loop stopped with checks still queued");
        }
        info!("Enforcement tick loop shut down");
    }
}
