//! Presentation sink: where applied moves go to be drawn
//!
//! The controller calls the sink synchronously from its worker thread after
//! every applied move. Implementations must not touch UI state directly;
//! they hand the snapshot off to whatever context owns rendering.

use super::{EventBus, HanoiEvent};
use crate::core::state::{AppliedMove, PuzzleState};

/// Receiver of state changes produced by a run
pub trait PresentationSink: Send + Sync {
    /// Called after each applied move with the state it produced
    fn on_state_changed(&self, run_id: u64, applied: &AppliedMove, snapshot: &PuzzleState);
}

/// Broadcasts each change as a [`HanoiEvent::MoveApplied`] for the render loop
impl PresentationSink for EventBus {
    fn on_state_changed(&self, run_id: u64, applied: &AppliedMove, snapshot: &PuzzleState) {
        self.emit(HanoiEvent::move_applied(run_id, *applied, snapshot.clone()));
    }
}

/// Sink that discards every change
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_state_changed(&self, _run_id: u64, _applied: &AppliedMove, _snapshot: &PuzzleState) {}
}
