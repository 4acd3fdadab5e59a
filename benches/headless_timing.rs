//! Headless Timing Benchmark
//!
//! Times both move generators on detached puzzles across disk counts and
//! checks that run time grows with the move count (`2^n - 1`).
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench headless_timing
//! ```

use hanoi::core::solver::move_count;
use hanoi::core::{run_headless, Algorithm, PegId};

/// Repetitions per (algorithm, disk count)
const TRIALS: usize = 5;

#[derive(Debug)]
struct BenchmarkResult {
    algorithm: Algorithm,
    n_disks: u8,
    moves: u64,
    min_ms: f64,
    mean_ms: f64,
}

impl BenchmarkResult {
    fn ns_per_move(&self) -> f64 {
        self.mean_ms * 1_000_000.0 / self.moves as f64
    }
}

fn time_algorithm(algorithm: Algorithm, n_disks: u8, trials: usize) -> BenchmarkResult {
    let mut timings = Vec::with_capacity(trials);

    for _ in 0..trials {
        match run_headless(algorithm, n_disks, PegId::A, PegId::C, PegId::B) {
            Ok(report) => {
                assert!(report.final_state.is_solved_on(PegId::C));
                timings.push(report.elapsed_ms());
            }
            Err(e) => panic!("headless run failed for {} disks: {}", n_disks, e),
        }
    }

    BenchmarkResult {
        algorithm,
        n_disks,
        moves: move_count(n_disks),
        min_ms: timings.iter().copied().fold(f64::INFINITY, f64::min),
        mean_ms: timings.iter().sum::<f64>() / trials as f64,
    }
}

fn main() {
    println!("=== Headless Timing Benchmark ===\n");
    println!(
        "{:<10} {:>6} {:>10} {:>12} {:>12} {:>10}",
        "algorithm", "disks", "moves", "min ms", "mean ms", "ns/move"
    );

    let mut results = Vec::new();
    for algorithm in Algorithm::ALL {
        for n_disks in [8_u8, 12, 16, 20] {
            let result = time_algorithm(algorithm, n_disks, TRIALS);
            println!(
                "{:<10} {:>6} {:>10} {:>12.3} {:>12.3} {:>10.1}",
                result.algorithm.name(),
                result.n_disks,
                result.moves,
                result.min_ms,
                result.mean_ms,
                result.ns_per_move()
            );
            results.push(result);
        }
    }

    // Each extra 4 disks is 16x the moves; time should grow accordingly
    println!("\nGrowth (20 disks vs 16 disks):");
    for algorithm in Algorithm::ALL {
        let at = |n: u8| {
            results
                .iter()
                .find(|r| r.algorithm == algorithm && r.n_disks == n)
                .map(|r| r.mean_ms)
                .unwrap_or(0.0)
        };
        let ratio = if at(16) > 0.0 { at(20) / at(16) } else { 0.0 };
        println!("  {}: {:.1}x (moves grew 16x)", algorithm, ratio);
    }
}
