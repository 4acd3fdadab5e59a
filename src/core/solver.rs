//! Move Generation for Towers of Hanoi
//!
//! Two generators produce the canonical minimal solution of `2^n - 1` moves:
//!
//! - [`solve_recursive`]: classic divide-and-conquer recursion
//! - [`IterativeMoves`]: the same recursion unrolled onto an explicit work stack
//!
//! Both push moves into a visitor. A visitor returning `ControlFlow::Break`
//! stops generation at once, which is how the controller aborts a run.
//!
//! # Ordering
//!
//! For the same `(n, from, to, aux)` both generators emit byte-identical
//! sequences:
//!
//! ```text
//! solve(n, f, t, a) = solve(n-1, f, a, t) ++ [f -> t] ++ solve(n-1, a, t, f)
//! ```

use crate::core::state::{Move, PegId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;

/// Which move generator to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Language-level recursion
    #[default]
    Recursive,
    /// Explicit stack of pending sub-tasks
    Iterative,
}

impl Algorithm {
    /// Both algorithms, recursive first
    pub const ALL: [Algorithm; 2] = [Algorithm::Recursive, Algorithm::Iterative];

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Recursive => "recursive",
            Algorithm::Iterative => "iterative",
        }
    }

    /// Generate the solution for `n` disks, feeding each move to `visitor`
    pub fn solve<V>(self, n: u8, from: PegId, to: PegId, aux: PegId, visitor: &mut V) -> ControlFlow<()>
    where
        V: FnMut(Move) -> ControlFlow<()>,
    {
        match self {
            Algorithm::Recursive => solve_recursive(n, from, to, aux, visitor),
            Algorithm::Iterative => solve_iterative(n, from, to, aux, visitor),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recursive" => Ok(Algorithm::Recursive),
            "iterative" => Ok(Algorithm::Iterative),
            other => Err(format!(
                "Invalid algorithm '{}'. Use: recursive, iterative",
                other
            )),
        }
    }
}

/// Number of moves in the minimal solution for `n` disks (`2^n - 1`)
///
/// `n` is clamped to 64, the largest count whose move total fits in `u64`.
pub fn move_count(n: u8) -> u64 {
    match n {
        0 => 0,
        n => u64::MAX >> (64 - u32::from(n.min(64))),
    }
}

/// Recursive generator
///
/// Zero disks yield zero moves.
pub fn solve_recursive<V>(n: u8, from: PegId, to: PegId, aux: PegId, visitor: &mut V) -> ControlFlow<()>
where
    V: FnMut(Move) -> ControlFlow<()>,
{
    if n == 0 {
        return ControlFlow::Continue(());
    }
    if n == 1 {
        return visitor(Move::new(from, to));
    }

    // Move n-1 disks out of the way onto the auxiliary peg
    solve_recursive(n - 1, from, aux, to, visitor)?;
    // Largest disk goes straight to the destination
    visitor(Move::new(from, to))?;
    // Bring the n-1 disks back on top of it
    solve_recursive(n - 1, aux, to, from, visitor)
}

/// Iterative generator driven by [`IterativeMoves`]
pub fn solve_iterative<V>(n: u8, from: PegId, to: PegId, aux: PegId, visitor: &mut V) -> ControlFlow<()>
where
    V: FnMut(Move) -> ControlFlow<()>,
{
    for mv in IterativeMoves::new(n, from, to, aux) {
        visitor(mv)?;
    }
    ControlFlow::Continue(())
}

/// Pending sub-problem on the work stack
#[derive(Debug, Clone, Copy)]
struct Task {
    disks: u8,
    from: PegId,
    to: PegId,
    aux: PegId,
}

/// Explicit-stack move generator
///
/// Each popped task with more than one disk is split into three tasks,
/// pushed in reverse so they pop as: `(n-1, from -> aux)`, `(1, from -> to)`,
/// `(n-1, aux -> to)`. The stack never grows beyond `2n + 1` entries.
#[derive(Debug, Clone)]
pub struct IterativeMoves {
    stack: Vec<Task>,
}

impl IterativeMoves {
    /// Start generating the solution for `n` disks
    pub fn new(n: u8, from: PegId, to: PegId, aux: PegId) -> Self {
        let mut stack = Vec::with_capacity(2 * n as usize + 1);
        if n > 0 {
            stack.push(Task {
                disks: n,
                from,
                to,
                aux,
            });
        }
        Self { stack }
    }
}

impl Iterator for IterativeMoves {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        while let Some(task) = self.stack.pop() {
            if task.disks == 1 {
                return Some(Move::new(task.from, task.to));
            }
            self.stack.push(Task {
                disks: task.disks - 1,
                from: task.aux,
                to: task.to,
                aux: task.from,
            });
            self.stack.push(Task {
                disks: 1,
                from: task.from,
                to: task.to,
                aux: task.aux,
            });
            self.stack.push(Task {
                disks: task.disks - 1,
                from: task.from,
                to: task.aux,
                aux: task.to,
            });
        }
        None
    }
}

/// Collect the full move sequence for `n` disks
pub fn moves(algorithm: Algorithm, n: u8, from: PegId, to: PegId, aux: PegId) -> Vec<Move> {
    let mut out = Vec::with_capacity(move_count(n).min(1 << 20) as usize);
    let _ = algorithm.solve(n, from, to, aux, &mut |mv| {
        out.push(mv);
        ControlFlow::Continue(())
    });
    out
}
