//! Core solver algorithms
//!
//! This module contains the puzzle model and everything that drives it:
//! - `state`: pegs, disks, moves and the puzzle invariants
//! - `solver`: recursive and explicit-stack iterative move generators
//! - `signals`: cancellation token and pause gate
//! - `timing`: restartable stop-once timer
//! - `controller`: animated runs on a worker thread with pause/resume/cancel
//! - `headless`: UI-free runs on a detached puzzle for timing

pub mod controller;
pub mod headless;
pub mod signals;
pub mod solver;
pub mod state;
pub mod timing;

pub use controller::{Controller, ControllerError, RunHandle, RunPhase, RunReport};
pub use headless::{run_headless, HeadlessReport};
pub use signals::{CancellationToken, PauseGate};
pub use solver::{
    move_count, moves, solve_iterative, solve_recursive, Algorithm, IterativeMoves,
};
pub use state::{AppliedMove, Move, PegId, PuzzleError, PuzzleState, HARD_MAX_DISKS};
pub use timing::Timing;
