//! Event-Driven Presentation and Observability
//!
//! Provides structured events for every stage of a solver run:
//! - Puzzle resets and run start
//! - Each applied move, with a state snapshot for rendering
//! - Pause, resume, completion, cancellation and failure
//! - Headless timing results
//!
//! # Architecture
//!
//! Events are emitted via an `EventBus` which uses a broadcast channel.
//! The worker thread never touches the UI; renderers and observers
//! subscribe to the bus and run on their own context:
//!
//! ```text
//! Controller worker → EventBus → [Renderer, LoggingObserver, MetricsObserver, ...]
//! ```

pub mod bus;
pub mod observers;
pub mod sink;

use crate::core::solver::Algorithm;
use crate::core::state::{AppliedMove, PuzzleState};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// All events emitted during solving
///
/// Events are tagged with their type for JSON serialization and include
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum HanoiEvent {
    /// The puzzle was rebuilt with a new disk count
    StateReset {
        /// Disks on the fresh puzzle
        n_disks: u8,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// An animated run began
    RunStarted {
        run_id: u64,
        n_disks: u8,
        algorithm: Algorithm,
        /// Moves the run will apply if it completes
        total_moves: u64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// A move was applied to the live puzzle
    MoveApplied {
        run_id: u64,
        #[serde(rename = "move")]
        applied: AppliedMove,
        /// Puzzle after the move
        state: PuzzleState,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// The run was paused before applying its next move
    RunPaused {
        run_id: u64,
        /// Moves applied so far
        moves_applied: u64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// A paused run was resumed
    RunResumed {
        run_id: u64,
        moves_applied: u64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// All moves were applied
    RunCompleted {
        run_id: u64,
        moves_applied: u64,
        /// Wall-clock duration in milliseconds
        elapsed_ms: f64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// The run stopped early on request
    RunCancelled {
        run_id: u64,
        moves_applied: u64,
        elapsed_ms: f64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// The run hit an internal invariant violation
    RunFailed {
        run_id: u64,
        moves_applied: u64,
        /// Description of the violation
        reason: String,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },

    /// A headless timing run finished
    HeadlessCompleted {
        n_disks: u8,
        algorithm: Algorithm,
        moves: u64,
        elapsed_ms: f64,
        #[serde(with = "system_time_serde")]
        timestamp: SystemTime,
    },
}

impl HanoiEvent {
    /// Create a StateReset event
    pub fn state_reset(n_disks: u8) -> Self {
        Self::StateReset {
            n_disks,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunStarted event
    pub fn run_started(run_id: u64, n_disks: u8, algorithm: Algorithm, total_moves: u64) -> Self {
        Self::RunStarted {
            run_id,
            n_disks,
            algorithm,
            total_moves,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a MoveApplied event
    pub fn move_applied(run_id: u64, applied: AppliedMove, state: PuzzleState) -> Self {
        Self::MoveApplied {
            run_id,
            applied,
            state,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunPaused event
    pub fn run_paused(run_id: u64, moves_applied: u64) -> Self {
        Self::RunPaused {
            run_id,
            moves_applied,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunResumed event
    pub fn run_resumed(run_id: u64, moves_applied: u64) -> Self {
        Self::RunResumed {
            run_id,
            moves_applied,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunCompleted event
    pub fn run_completed(run_id: u64, moves_applied: u64, elapsed_ms: f64) -> Self {
        Self::RunCompleted {
            run_id,
            moves_applied,
            elapsed_ms,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunCancelled event
    pub fn run_cancelled(run_id: u64, moves_applied: u64, elapsed_ms: f64) -> Self {
        Self::RunCancelled {
            run_id,
            moves_applied,
            elapsed_ms,
            timestamp: SystemTime::now(),
        }
    }

    /// Create a RunFailed event
    pub fn run_failed(run_id: u64, moves_applied: u64, reason: &str) -> Self {
        Self::RunFailed {
            run_id,
            moves_applied,
            reason: reason.to_string(),
            timestamp: SystemTime::now(),
        }
    }

    /// Create a HeadlessCompleted event
    pub fn headless_completed(n_disks: u8, algorithm: Algorithm, moves: u64, elapsed_ms: f64) -> Self {
        Self::HeadlessCompleted {
            n_disks,
            algorithm,
            moves,
            elapsed_ms,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StateReset { .. } => "StateReset",
            Self::RunStarted { .. } => "RunStarted",
            Self::MoveApplied { .. } => "MoveApplied",
            Self::RunPaused { .. } => "RunPaused",
            Self::RunResumed { .. } => "RunResumed",
            Self::RunCompleted { .. } => "RunCompleted",
            Self::RunCancelled { .. } => "RunCancelled",
            Self::RunFailed { .. } => "RunFailed",
            Self::HeadlessCompleted { .. } => "HeadlessCompleted",
        }
    }

    /// Run the event belongs to, if any
    pub fn run_id(&self) -> Option<u64> {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::MoveApplied { run_id, .. }
            | Self::RunPaused { run_id, .. }
            | Self::RunResumed { run_id, .. }
            | Self::RunCompleted { run_id, .. }
            | Self::RunCancelled { run_id, .. }
            | Self::RunFailed { run_id, .. } => Some(*run_id),
            Self::StateReset { .. } | Self::HeadlessCompleted { .. } => None,
        }
    }

    /// Whether this event ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RunCompleted { .. } | Self::RunCancelled { .. } | Self::RunFailed { .. }
        )
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> SystemTime {
        match self {
            Self::StateReset { timestamp, .. }
            | Self::RunStarted { timestamp, .. }
            | Self::MoveApplied { timestamp, .. }
            | Self::RunPaused { timestamp, .. }
            | Self::RunResumed { timestamp, .. }
            | Self::RunCompleted { timestamp, .. }
            | Self::RunCancelled { timestamp, .. }
            | Self::RunFailed { timestamp, .. }
            | Self::HeadlessCompleted { timestamp, .. } => *timestamp,
        }
    }
}

/// Serde module for SystemTime serialization
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis))
    }
}

// Re-exports
pub use bus::EventBus;
pub use sink::{NullSink, PresentationSink};
