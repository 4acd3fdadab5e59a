//! Metrics Observer
//!
//! Tracks Prometheus-compatible metrics for solver runs:
//! - Counters: runs by algorithm and outcome, moves applied, pauses
//! - Histograms: run duration
//! - Gauges: latest headless timing per algorithm

use crate::events::{EventBus, HanoiEvent};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Histogram bucket boundaries for run duration (milliseconds)
pub const DURATION_BUCKETS: [u64; 7] = [10, 100, 1_000, 10_000, 60_000, 600_000, 3_600_000];

/// Metrics collected from solver events
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Runs started, by algorithm
    pub runs_started: HashMap<String, u64>,
    /// Runs that applied every move
    pub runs_completed: u64,
    /// Runs stopped on request
    pub runs_cancelled: u64,
    /// Runs stopped on an invariant violation
    pub runs_failed: u64,
    /// Moves applied across all runs
    pub moves_applied: u64,
    /// Moves applied, by disk size
    pub moves_by_disk: BTreeMap<u8, u64>,
    /// Times a run was paused
    pub pauses: u64,
    /// Run duration histogram (bucket -> count)
    pub duration_histogram: HashMap<u64, u64>,
    /// Total run duration for average calculation
    pub duration_sum_ms: f64,
    /// Finished runs with a recorded duration
    pub duration_count: u64,
    /// Latest headless elapsed time, by algorithm
    pub headless_ms: HashMap<String, f64>,
}

impl Metrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run start
    pub fn record_run_started(&mut self, algorithm: &str) {
        *self.runs_started.entry(algorithm.to_string()).or_insert(0) += 1;
    }

    /// Record one applied move of `disk`
    pub fn record_move(&mut self, disk: u8) {
        self.moves_applied += 1;
        *self.moves_by_disk.entry(disk).or_insert(0) += 1;
    }

    /// Record a finished run's duration
    pub fn record_duration(&mut self, elapsed_ms: f64) {
        let bucket = DURATION_BUCKETS
            .iter()
            .copied()
            .find(|&b| elapsed_ms <= b as f64)
            // Larger than all buckets: count in the last one
            .unwrap_or(DURATION_BUCKETS[DURATION_BUCKETS.len() - 1]);
        *self.duration_histogram.entry(bucket).or_insert(0) += 1;

        self.duration_sum_ms += elapsed_ms;
        self.duration_count += 1;
    }

    /// Record a headless timing
    pub fn record_headless(&mut self, algorithm: &str, elapsed_ms: f64) {
        self.headless_ms.insert(algorithm.to_string(), elapsed_ms);
    }

    /// Get average run duration in milliseconds
    pub fn avg_duration_ms(&self) -> f64 {
        if self.duration_count == 0 {
            0.0
        } else {
            self.duration_sum_ms / self.duration_count as f64
        }
    }

    /// Format metrics as Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP hanoi_runs_started_total Runs started\n");
        output.push_str("# TYPE hanoi_runs_started_total counter\n");
        for (algorithm, count) in &self.runs_started {
            output.push_str(&format!(
                "hanoi_runs_started_total{{algorithm=\"{}\"}} {}\n",
                algorithm, count
            ));
        }

        output.push_str("# HELP hanoi_runs_finished_total Runs finished, by outcome\n");
        output.push_str("# TYPE hanoi_runs_finished_total counter\n");
        for (outcome, count) in [
            ("completed", self.runs_completed),
            ("cancelled", self.runs_cancelled),
            ("failed", self.runs_failed),
        ] {
            output.push_str(&format!(
                "hanoi_runs_finished_total{{outcome=\"{}\"}} {}\n",
                outcome, count
            ));
        }

        output.push_str("# HELP hanoi_moves_applied_total Moves applied\n");
        output.push_str("# TYPE hanoi_moves_applied_total counter\n");
        output.push_str(&format!("hanoi_moves_applied_total {}\n", self.moves_applied));

        output.push_str("# HELP hanoi_pauses_total Times a run was paused\n");
        output.push_str("# TYPE hanoi_pauses_total counter\n");
        output.push_str(&format!("hanoi_pauses_total {}\n", self.pauses));

        output.push_str("# HELP hanoi_run_duration_ms Run duration in milliseconds\n");
        output.push_str("# TYPE hanoi_run_duration_ms histogram\n");
        let mut cumulative = 0u64;
        for &bucket in &DURATION_BUCKETS {
            cumulative += self.duration_histogram.get(&bucket).copied().unwrap_or(0);
            output.push_str(&format!(
                "hanoi_run_duration_ms_bucket{{le=\"{}\"}} {}\n",
                bucket, cumulative
            ));
        }
        output.push_str(&format!(
            "hanoi_run_duration_ms_bucket{{le=\"+Inf\"}} {}\n",
            self.duration_count
        ));
        output.push_str(&format!(
            "hanoi_run_duration_ms_sum {}\n",
            self.duration_sum_ms
        ));
        output.push_str(&format!(
            "hanoi_run_duration_ms_count {}\n",
            self.duration_count
        ));

        output.push_str("# HELP hanoi_headless_ms Latest headless run time in milliseconds\n");
        output.push_str("# TYPE hanoi_headless_ms gauge\n");
        for (algorithm, ms) in &self.headless_ms {
            output.push_str(&format!(
                "hanoi_headless_ms{{algorithm=\"{}\"}} {}\n",
                algorithm, ms
            ));
        }

        output
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut output = String::new();

        output.push_str("=== Hanoi Metrics Report ===\n\n");

        output.push_str("Runs started:\n");
        for (algorithm, count) in &self.runs_started {
            output.push_str(&format!("  {}: {}\n", algorithm, count));
        }

        output.push_str(&format!(
            "\nOutcomes: completed={}, cancelled={}, failed={}\n",
            self.runs_completed, self.runs_cancelled, self.runs_failed
        ));

        output.push_str(&format!(
            "Moves: total={}, pauses={}\n",
            self.moves_applied, self.pauses
        ));
        for (disk, count) in &self.moves_by_disk {
            output.push_str(&format!("  disk {}: {}\n", disk, count));
        }

        output.push_str(&format!(
            "\nDuration: avg={:.1}ms, count={}\n",
            self.avg_duration_ms(),
            self.duration_count
        ));

        if !self.headless_ms.is_empty() {
            output.push_str("\nHeadless:\n");
            for (algorithm, ms) in &self.headless_ms {
                output.push_str(&format!("  {}: {:.3}ms\n", algorithm, ms));
            }
        }

        output
    }
}

/// Observer that collects metrics from solver events
pub struct MetricsObserver {
    receiver: broadcast::Receiver<HanoiEvent>,
    metrics: Arc<Mutex<Metrics>>,
}

impl MetricsObserver {
    /// Create a new metrics observer subscribed to the event bus
    pub fn new(bus: &EventBus) -> Self {
        Self {
            receiver: bus.subscribe(),
            metrics: Arc::new(Mutex::new(Metrics::new())),
        }
    }

    /// Get a handle to the metrics for reading
    pub fn metrics(&self) -> Arc<Mutex<Metrics>> {
        Arc::clone(&self.metrics)
    }

    /// Run the observer, collecting metrics until the channel closes
    pub async fn run(mut self) {
        loop {
            match self.receiver.recv().await {
                Ok(event) => self.process_event(&event),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Process a single event and update metrics
    pub fn process_event(&self, event: &HanoiEvent) {
        let mut metrics = self.lock();

        match event {
            HanoiEvent::StateReset { .. } | HanoiEvent::RunResumed { .. } => {}

            HanoiEvent::RunStarted { algorithm, .. } => {
                metrics.record_run_started(algorithm.name());
            }

            HanoiEvent::MoveApplied { applied, .. } => {
                metrics.record_move(applied.disk);
            }

            HanoiEvent::RunPaused { .. } => {
                metrics.pauses += 1;
            }

            HanoiEvent::RunCompleted { elapsed_ms, .. } => {
                metrics.runs_completed += 1;
                metrics.record_duration(*elapsed_ms);
            }

            HanoiEvent::RunCancelled { elapsed_ms, .. } => {
                metrics.runs_cancelled += 1;
                metrics.record_duration(*elapsed_ms);
            }

            HanoiEvent::RunFailed { .. } => {
                metrics.runs_failed += 1;
            }

            HanoiEvent::HeadlessCompleted {
                algorithm,
                elapsed_ms,
                ..
            } => {
                metrics.record_headless(algorithm.name(), *elapsed_ms);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Metrics> {
        self.metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
