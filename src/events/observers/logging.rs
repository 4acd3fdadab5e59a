//! Logging Observer
//!
//! Structured logging for solver events using the `tracing` crate.
//! Events are logged at appropriate levels:
//! - INFO: StateReset, RunStarted, RunCompleted, RunCancelled, HeadlessCompleted
//! - WARN: lagging behind the bus
//! - ERROR: RunFailed
//! - DEBUG: MoveApplied, RunPaused, RunResumed

use crate::events::{EventBus, HanoiEvent};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Observer that logs solver events using tracing
pub struct LoggingObserver {
    receiver: broadcast::Receiver<HanoiEvent>,
}

impl LoggingObserver {
    /// Create a new logging observer subscribed to the event bus
    pub fn new(bus: &EventBus) -> Self {
        Self {
            receiver: bus.subscribe(),
        }
    }

    /// Run the observer, logging events until the channel closes
    ///
    /// This should be spawned as a tokio task:
    /// ```rust,ignore
    /// tokio::spawn(observer.run());
    /// ```
    pub async fn run(mut self) {
        loop {
            match self.receiver.recv().await {
                Ok(event) => Self::log_event(&event),
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("EventBus closed, logging observer stopping");
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(
                        skipped = count,
                        "Logging observer lagged, skipped {} events", count
                    );
                }
            }
        }
    }

    /// Log a single event at the appropriate level
    pub fn log_event(event: &HanoiEvent) {
        match event {
            HanoiEvent::StateReset { n_disks, .. } => {
                info!(disks = n_disks, "Puzzle reset");
            }

            HanoiEvent::RunStarted {
                run_id,
                n_disks,
                algorithm,
                total_moves,
                ..
            } => {
                info!(
                    run = run_id,
                    disks = n_disks,
                    algorithm = %algorithm,
                    total_moves = total_moves,
                    "Run started"
                );
            }

            HanoiEvent::MoveApplied {
                run_id, applied, ..
            } => {
                debug!(
                    run = run_id,
                    step = applied.step,
                    disk = applied.disk,
                    from = %applied.from,
                    to = %applied.to,
                    "Move applied"
                );
            }

            HanoiEvent::RunPaused {
                run_id,
                moves_applied,
                ..
            } => {
                debug!(run = run_id, moves = moves_applied, "Run paused");
            }

            HanoiEvent::RunResumed {
                run_id,
                moves_applied,
                ..
            } => {
                debug!(run = run_id, moves = moves_applied, "Run resumed");
            }

            HanoiEvent::RunCompleted {
                run_id,
                moves_applied,
                elapsed_ms,
                ..
            } => {
                info!(
                    run = run_id,
                    moves = moves_applied,
                    elapsed_ms = %elapsed_ms,
                    "Run completed"
                );
            }

            HanoiEvent::RunCancelled {
                run_id,
                moves_applied,
                elapsed_ms,
                ..
            } => {
                info!(
                    run = run_id,
                    moves = moves_applied,
                    elapsed_ms = %elapsed_ms,
                    "Run cancelled"
                );
            }

            HanoiEvent::RunFailed {
                run_id,
                moves_applied,
                reason,
                ..
            } => {
                error!(
                    run = run_id,
                    moves = moves_applied,
                    reason = %reason,
                    "Run failed"
                );
            }

            HanoiEvent::HeadlessCompleted {
                n_disks,
                algorithm,
                moves,
                elapsed_ms,
                ..
            } => {
                info!(
                    disks = n_disks,
                    algorithm = %algorithm,
                    moves = moves,
                    elapsed_ms = %elapsed_ms,
                    "Headless run completed"
                );
            }
        }
    }
}
