//! Headless Runs
//!
//! Executes a move generator against a private, throwaway puzzle with no
//! pause gate, cancellation or rendering, to time the bare algorithm.

use crate::core::solver::{move_count, Algorithm};
use crate::core::state::{PegId, PuzzleError, PuzzleState};
use crate::core::timing::{duration_ms, Timing};
use std::ops::ControlFlow;
use std::time::Duration;

/// Result of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub n_disks: u8,
    pub algorithm: Algorithm,
    /// Moves applied
    pub moves: u64,
    /// Time from first generated move to last applied move
    pub elapsed: Duration,
    /// Puzzle after the run
    pub final_state: PuzzleState,
}

impl HeadlessReport {
    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed)
    }
}

/// Solve `n` disks from `from` to `to` on a detached puzzle
///
/// Every move is applied through the checked [`PuzzleState::apply`]; an
/// illegal move aborts the run with the offending error.
pub fn run_headless(
    algorithm: Algorithm,
    n: u8,
    from: PegId,
    to: PegId,
    aux: PegId,
) -> Result<HeadlessReport, PuzzleError> {
    let mut state = PuzzleState::all_on(n, from)?;
    let mut moves = 0u64;
    let mut failure = None;

    let mut timing = Timing::started();
    let _ = algorithm.solve(n, from, to, aux, &mut |mv| match state.apply(mv) {
        Ok(_) => {
            moves += 1;
            ControlFlow::Continue(())
        }
        Err(e) => {
            failure = Some(e);
            ControlFlow::Break(())
        }
    });
    let elapsed = timing.stop().unwrap_or_default();

    if let Some(e) = failure {
        return Err(e);
    }

    debug_assert_eq!(moves, move_count(n));

    Ok(HeadlessReport {
        n_disks: n,
        algorithm,
        moves,
        elapsed,
        final_state: state,
    })
}
