//! Hanoi - Animated Towers of Hanoi Solver
//!
//! Solves the classic three-peg puzzle with either a recursive or an
//! explicit-stack iterative generator and plays the solution back move by
//! move with cooperative pause, resume and cancellation:
//!
//! - **Move generation**: both generators emit the same `2^n - 1` moves
//! - **Controller**: a worker thread applies moves to a live puzzle and hands
//!   each one to a presentation sink, waiting on a pause gate between moves
//! - **Headless runs**: the same generator on a detached puzzle, for timing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hanoi::{Algorithm, Controller, ControllerConfig};
//!
//! let mut controller = Controller::new(ControllerConfig::default()).unwrap();
//! controller.set_disk_count(5).unwrap();
//! controller.select_algorithm(Algorithm::Iterative);
//!
//! let run = controller.start().unwrap();
//! let report = run.join().unwrap();
//! println!("{} moves in {:.3} ms", report.moves_applied, report.elapsed_ms());
//! ```

pub mod config;
pub mod core;
pub mod events;
pub mod render;

// Re-export commonly used items at crate root
pub use config::ControllerConfig;
pub use core::{
    Algorithm, Controller, ControllerError, HeadlessReport, Move, PegId, PuzzleError,
    PuzzleState, RunHandle, RunPhase, RunReport,
};
pub use events::observers::{LoggingObserver, MetricsObserver};
pub use events::{EventBus, HanoiEvent, PresentationSink};
