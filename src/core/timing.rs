//! Wall-clock timing for solver runs

use std::time::{Duration, Instant};

/// Restartable stopwatch that records one result per run
///
/// `start` always begins a fresh measurement. `stop` only records a result
/// the first time it is called after a `start`.
#[derive(Debug, Clone, Default)]
pub struct Timing {
    started: Option<Instant>,
    result: Option<Duration>,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer that is already running
    pub fn started() -> Self {
        let mut timing = Self::new();
        timing.start();
        timing
    }

    /// Begin (or restart) a measurement, discarding any previous result
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.result = None;
    }

    /// Stop the running measurement
    ///
    /// Returns `None` if the timer is not running (never started or
    /// already stopped).
    pub fn stop(&mut self) -> Option<Duration> {
        let started = self.started.take()?;
        let elapsed = started.elapsed();
        self.result = Some(elapsed);
        Some(elapsed)
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Duration recorded by the last `stop`
    pub fn result(&self) -> Option<Duration> {
        self.result
    }

    /// Recorded duration in fractional milliseconds, or the live reading
    /// while running
    pub fn elapsed_ms(&self) -> f64 {
        let elapsed = match (self.result, self.started) {
            (Some(result), _) => result,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        };
        duration_ms(elapsed)
    }
}

/// Convert a duration to fractional milliseconds
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
