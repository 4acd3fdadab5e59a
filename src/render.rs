//! Text rendering of puzzle states
//!
//! Two forms are provided:
//! - [`render_rods`]: the three rods drawn side by side, disks as `=` bars
//! - [`render_line`]: one line listing each peg bottom to top

use crate::core::state::{AppliedMove, PegId, PuzzleState};

/// Draw the puzzle as ASCII rods
///
/// Disk `d` is `2d + 1` characters wide, centred on its rod; every rod
/// column is as wide as the largest disk.
///
/// ```text
///  ===    |     |
/// =====   |     |
/// -----------------
///   A     B     C
/// ```
pub fn render_rods(state: &PuzzleState) -> String {
    let n = usize::from(state.n_disks());
    let width = 2 * n + 1;
    let height = n.max(1);
    let mut lines = Vec::with_capacity(height + 2);

    for level in (0..height).rev() {
        let row: Vec<String> = PegId::ALL
            .iter()
            .map(|&peg| match state.peg(peg).get(level) {
                Some(&disk) => cell(width, &"=".repeat(2 * usize::from(disk) + 1)),
                None => cell(width, "|"),
            })
            .collect();
        lines.push(row.join(" ").trim_end().to_string());
    }

    lines.push("-".repeat(3 * width + 2));

    let labels: Vec<String> = PegId::ALL
        .iter()
        .map(|peg| cell(width, &peg.to_string()))
        .collect();
    lines.push(labels.join(" ").trim_end().to_string());

    lines.join("\n")
}

/// One-line summary, e.g. `A: [3, 2]  B: []  C: [1]`
pub fn render_line(state: &PuzzleState) -> String {
    PegId::ALL
        .iter()
        .map(|&peg| format!("{}: {:?}", peg, state.peg(peg)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Progress line for an applied move, e.g. `[  3/7] Move disk 1 from A to C`
pub fn render_step(applied: &AppliedMove, total_moves: u64) -> String {
    let digits = total_moves.to_string().len();
    format!(
        "[{:>width$}/{}] {}",
        applied.step,
        total_moves,
        applied,
        width = digits
    )
}

fn cell(width: usize, content: &str) -> String {
    format!("{:^width$}", content, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Move;

    #[test]
    fn test_render_rods_initial() {
        let state = PuzzleState::new(2).unwrap();
        let expected = [
            " ===    |     |",
            "=====   |     |",
            "-----------------",
            "  A     B     C",
        ]
        .join("\n");
        assert_eq!(render_rods(&state), expected);
    }

    #[test]
    fn test_render_rods_after_move() {
        let mut state = PuzzleState::new(2).unwrap();
        state.apply(Move::new(PegId::A, PegId::C)).unwrap();
        let expected = [
            "  |     |     |",
            "=====   |    ===",
            "-----------------",
            "  A     B     C",
        ]
        .join("\n");
        assert_eq!(render_rods(&state), expected);
    }

    #[test]
    fn test_render_rods_empty_puzzle() {
        let state = PuzzleState::new(0).unwrap();
        assert_eq!(render_rods(&state), "| | |\n-----\nA B C");
    }

    #[test]
    fn test_render_line() {
        let mut state = PuzzleState::new(3).unwrap();
        state.apply(Move::new(PegId::A, PegId::C)).unwrap();
        assert_eq!(render_line(&state), "A: [3, 2]  B: []  C: [1]");
    }

    #[test]
    fn test_render_step_pads_to_total() {
        let applied = AppliedMove {
            step: 3,
            disk: 1,
            from: PegId::A,
            to: PegId::C,
        };
        assert_eq!(
            render_step(&applied, 127),
            "[  3/127] Move disk 1 from A to C"
        );
    }
}
