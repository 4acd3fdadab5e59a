//! Towers of Hanoi State and Move Representations
//!
//! Implements the peg/disk state tracking and move validation for the puzzle.
//!
//! # Invariants
//!
//! - Within a peg, disk sizes strictly decrease from bottom to top
//! - Across all pegs, the disks are exactly `{1..=n_disks}`, each once

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest supported disk count (`2^64 - 1` moves still fits in a `u64`)
pub const HARD_MAX_DISKS: u8 = 64;

/// Identifier of one of the three pegs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PegId {
    A,
    B,
    C,
}

impl PegId {
    /// All pegs in display order
    pub const ALL: [PegId; 3] = [PegId::A, PegId::B, PegId::C];

    /// Array index of this peg (A=0, B=1, C=2)
    pub fn index(self) -> usize {
        match self {
            PegId::A => 0,
            PegId::B => 1,
            PegId::C => 2,
        }
    }

    /// Single-letter name of this peg
    pub fn as_char(self) -> char {
        match self {
            PegId::A => 'A',
            PegId::B => 'B',
            PegId::C => 'C',
        }
    }

    /// The peg that is neither `self` nor `other`
    ///
    /// Returns `None` when both arguments name the same peg.
    pub fn third(self, other: PegId) -> Option<PegId> {
        if self == other {
            return None;
        }
        PegId::ALL.into_iter().find(|p| *p != self && *p != other)
    }
}

impl fmt::Display for PegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PegId {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(PegId::A),
            "B" | "b" => Ok(PegId::B),
            "C" | "c" => Ok(PegId::C),
            other => Err(PuzzleError::UnknownPeg {
                name: other.to_string(),
            }),
        }
    }
}

/// Transfer of the top disk from one peg to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Source peg
    pub from: PegId,
    /// Destination peg
    pub to: PegId,
}

impl Move {
    /// Create a move from `from` to `to`
    pub fn new(from: PegId, to: PegId) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A move that has been applied to a live state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// 1-based position of the move in the run
    pub step: u64,
    /// Size of the disk that moved
    pub disk: u8,
    /// Source peg
    pub from: PegId,
    /// Destination peg
    pub to: PegId,
}

impl AppliedMove {
    /// The bare move without step and disk
    pub fn as_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

impl fmt::Display for AppliedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Move disk {} from {} to {}",
            self.disk, self.from, self.to
        )
    }
}

/// Errors raised when a state would break the puzzle rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// Source and destination are the same peg
    SamePeg { peg: PegId },
    /// Source peg holds no disk
    EmptySource { peg: PegId },
    /// Moving disk is larger than the destination's top disk
    LargerOnSmaller { disk: u8, onto: u8, peg: PegId },
    /// Disk sizes on a peg are not strictly decreasing bottom to top
    OrderViolation { peg: PegId },
    /// The disks across all pegs are not exactly `{1..=n}`
    DiskSetMismatch { expected: u8 },
    /// Disk count above [`HARD_MAX_DISKS`]
    TooManyDisks { n: u8 },
    /// Peg name other than A, B or C
    UnknownPeg { name: String },
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::SamePeg { peg } => {
                write!(f, "Illegal move: source and destination are both {}", peg)
            }
            PuzzleError::EmptySource { peg } => {
                write!(f, "Illegal move: peg {} is empty", peg)
            }
            PuzzleError::LargerOnSmaller { disk, onto, peg } => write!(
                f,
                "Illegal move: disk {} cannot be placed on disk {} (peg {})",
                disk, onto, peg
            ),
            PuzzleError::OrderViolation { peg } => {
                write!(f, "Peg {} is not ordered largest-at-bottom", peg)
            }
            PuzzleError::DiskSetMismatch { expected } => {
                write!(f, "Pegs do not hold exactly the disks 1..={}", expected)
            }
            PuzzleError::TooManyDisks { n } => {
                write!(f, "Disk count {} exceeds maximum {}", n, HARD_MAX_DISKS)
            }
            PuzzleError::UnknownPeg { name } => {
                write!(f, "Unknown peg '{}'. Use: A, B, C", name)
            }
        }
    }
}

impl std::error::Error for PuzzleError {}

/// State of the Towers of Hanoi puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleState {
    /// Three pegs, each a stack of disks
    /// Disk values: 1 = smallest, n = largest
    /// Stack order: bottom to top (last element is top disk)
    pegs: [Vec<u8>; 3],
    /// Total number of disks
    n_disks: u8,
}

impl PuzzleState {
    /// Create initial state with all disks on peg A
    pub fn new(n_disks: u8) -> Result<Self, PuzzleError> {
        Self::all_on(n_disks, PegId::A)
    }

    /// Create a state with every disk stacked on `peg`
    pub fn all_on(n_disks: u8, peg: PegId) -> Result<Self, PuzzleError> {
        if n_disks > HARD_MAX_DISKS {
            return Err(PuzzleError::TooManyDisks { n: n_disks });
        }
        let mut pegs: [Vec<u8>; 3] = Default::default();
        // Largest at bottom: [n, n-1, ..., 1]
        pegs[peg.index()] = (1..=n_disks).rev().collect();
        Ok(Self { pegs, n_disks })
    }

    /// Total number of disks in the puzzle
    pub fn n_disks(&self) -> u8 {
        self.n_disks
    }

    /// Disks on `peg`, bottom to top
    pub fn peg(&self, peg: PegId) -> &[u8] {
        &self.pegs[peg.index()]
    }

    /// All three pegs, indexed A, B, C
    pub fn pegs(&self) -> &[Vec<u8>; 3] {
        &self.pegs
    }

    /// Top (smallest exposed) disk on `peg`
    pub fn top(&self, peg: PegId) -> Option<u8> {
        self.pegs[peg.index()].last().copied()
    }

    /// Check a move against the puzzle rules without applying it
    pub fn check_move(&self, mv: Move) -> Result<u8, PuzzleError> {
        if mv.from == mv.to {
            return Err(PuzzleError::SamePeg { peg: mv.from });
        }
        let disk = self
            .top(mv.from)
            .ok_or(PuzzleError::EmptySource { peg: mv.from })?;
        match self.top(mv.to) {
            Some(onto) if onto < disk => Err(PuzzleError::LargerOnSmaller {
                disk,
                onto,
                peg: mv.to,
            }),
            _ => Ok(disk),
        }
    }

    /// Check if a move is legal
    pub fn is_legal(&self, mv: Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Apply a move in place, returning the disk that moved
    ///
    /// The state is left untouched when the move is illegal.
    pub fn apply(&mut self, mv: Move) -> Result<u8, PuzzleError> {
        let disk = self.check_move(mv)?;
        self.pegs[mv.from.index()].pop();
        self.pegs[mv.to.index()].push(disk);
        Ok(disk)
    }

    /// Verify peg ordering and that the disks are exactly `{1..=n}`
    pub fn check_invariants(&self) -> Result<(), PuzzleError> {
        let mut seen = vec![false; self.n_disks as usize];
        let mut total = 0usize;

        for peg in PegId::ALL {
            let disks = self.peg(peg);
            if disks.windows(2).any(|w| w[0] <= w[1]) {
                return Err(PuzzleError::OrderViolation { peg });
            }
            for &disk in disks {
                let slot = (disk as usize)
                    .checked_sub(1)
                    .and_then(|i| seen.get_mut(i))
                    .ok_or(PuzzleError::DiskSetMismatch {
                        expected: self.n_disks,
                    })?;
                if *slot {
                    return Err(PuzzleError::DiskSetMismatch {
                        expected: self.n_disks,
                    });
                }
                *slot = true;
                total += 1;
            }
        }

        if total != self.n_disks as usize {
            return Err(PuzzleError::DiskSetMismatch {
                expected: self.n_disks,
            });
        }
        Ok(())
    }

    /// Check if every disk sits on `peg` (the other pegs are empty)
    pub fn is_solved_on(&self, peg: PegId) -> bool {
        self.peg(peg).len() == self.n_disks as usize
            && PegId::ALL
                .into_iter()
                .filter(|p| *p != peg)
                .all(|p| self.peg(p).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_3_disks() {
        let state = PuzzleState::new(3).unwrap();
        assert_eq!(state.peg(PegId::A), &[3, 2, 1]);
        assert!(state.peg(PegId::B).is_empty());
        assert!(state.peg(PegId::C).is_empty());
        assert_eq!(state.n_disks(), 3);
    }

    #[test]
    fn test_all_on_other_peg() {
        let state = PuzzleState::all_on(4, PegId::B).unwrap();
        assert_eq!(state.peg(PegId::B), &[4, 3, 2, 1]);
        assert!(state.is_solved_on(PegId::B));
        assert!(!state.is_solved_on(PegId::A));
    }

    #[test]
    fn test_zero_disks_is_empty_and_valid() {
        let state = PuzzleState::new(0).unwrap();
        assert!(state.pegs().iter().all(Vec::is_empty));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_rejects_too_many_disks() {
        assert_eq!(
            PuzzleState::new(65),
            Err(PuzzleError::TooManyDisks { n: 65 })
        );
    }

    #[test]
    fn test_is_legal_move_valid() {
        let state = PuzzleState::new(3).unwrap();
        assert!(state.is_legal(Move::new(PegId::A, PegId::B)));
        assert!(state.is_legal(Move::new(PegId::A, PegId::C)));
    }

    #[test]
    fn test_is_legal_move_empty_source() {
        let state = PuzzleState::new(3).unwrap();
        assert_eq!(
            state.check_move(Move::new(PegId::B, PegId::A)),
            Err(PuzzleError::EmptySource { peg: PegId::B })
        );
    }

    #[test]
    fn test_is_legal_move_larger_on_smaller() {
        let mut state = PuzzleState::new(3).unwrap();
        state.apply(Move::new(PegId::A, PegId::B)).unwrap();
        assert_eq!(
            state.check_move(Move::new(PegId::A, PegId::B)),
            Err(PuzzleError::LargerOnSmaller {
                disk: 2,
                onto: 1,
                peg: PegId::B
            })
        );
    }

    #[test]
    fn test_same_peg_is_illegal() {
        let state = PuzzleState::new(2).unwrap();
        assert!(!state.is_legal(Move::new(PegId::A, PegId::A)));
    }

    #[test]
    fn test_apply_move() {
        let mut state = PuzzleState::new(3).unwrap();
        let disk = state.apply(Move::new(PegId::A, PegId::C)).unwrap();

        assert_eq!(disk, 1);
        assert_eq!(state.peg(PegId::A), &[3, 2]);
        assert!(state.peg(PegId::B).is_empty());
        assert_eq!(state.peg(PegId::C), &[1]);
    }

    #[test]
    fn test_illegal_apply_leaves_state_untouched() {
        let mut state = PuzzleState::new(2).unwrap();
        state.apply(Move::new(PegId::A, PegId::B)).unwrap();
        let before = state.clone();

        assert!(state.apply(Move::new(PegId::A, PegId::B)).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_check_invariants_detects_order_violation() {
        let state: PuzzleState =
            serde_json::from_str(r#"{"pegs":[[1,2],[],[]],"n_disks":2}"#).unwrap();
        assert_eq!(
            state.check_invariants(),
            Err(PuzzleError::OrderViolation { peg: PegId::A })
        );
    }

    #[test]
    fn test_check_invariants_detects_missing_disk() {
        let state: PuzzleState =
            serde_json::from_str(r#"{"pegs":[[3,1],[],[]],"n_disks":3}"#).unwrap();
        assert_eq!(
            state.check_invariants(),
            Err(PuzzleError::DiskSetMismatch { expected: 3 })
        );
    }

    #[test]
    fn test_peg_parse_and_display() {
        assert_eq!("a".parse::<PegId>().unwrap(), PegId::A);
        assert_eq!("C".parse::<PegId>().unwrap(), PegId::C);
        assert!("D".parse::<PegId>().is_err());
        assert_eq!(PegId::B.to_string(), "B");
    }

    #[test]
    fn test_third_peg() {
        assert_eq!(PegId::A.third(PegId::C), Some(PegId::B));
        assert_eq!(PegId::B.third(PegId::A), Some(PegId::C));
        assert_eq!(PegId::A.third(PegId::A), None);
    }

    #[test]
    fn test_applied_move_display() {
        let mv = AppliedMove {
            step: 1,
            disk: 1,
            from: PegId::A,
            to: PegId::C,
        };
        assert_eq!(mv.to_string(), "Move disk 1 from A to C");
        assert_eq!(mv.as_move(), Move::new(PegId::A, PegId::C));
    }
}
