//! Execution Controller
//!
//! Drives a move generator against a live puzzle on a background worker
//! thread, honoring cooperative pause and cancellation, and hands every
//! applied move to a [`PresentationSink`].
//!
//! # Run lifecycle
//!
//! ```text
//! Idle → Running ⇄ Paused
//!           ↓
//!   Completed | Cancelled | Failed
//! ```
//!
//! Each run owns its puzzle, pause gate and cancellation token, so two runs
//! never share state. Starting a new run (or changing the disk count)
//! cancels the previous run and opens its gate. Cancellation is final: a
//! cancelled run refuses further pause and resume requests.
//!
//! # Worker loop
//!
//! Before each move the worker waits on the pause gate, then checks the
//! cancellation token. A cancelled run stops without applying the move and
//! keeps its partial puzzle.

use crate::config::ControllerConfig;
use crate::core::headless::{run_headless, HeadlessReport};
use crate::core::signals::{CancellationToken, PauseGate};
use crate::core::solver::{move_count, Algorithm};
use crate::core::state::{AppliedMove, PegId, PuzzleError, PuzzleState};
use crate::core::timing::{duration_ms, Timing};
use crate::events::{EventBus, HanoiEvent, PresentationSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Fresh puzzle, no worker
    Idle,
    /// Worker is applying moves
    Running,
    /// Worker is blocked before its next move
    Paused,
    /// Every move was applied
    Completed,
    /// Stopped early on request
    Cancelled,
    /// Stopped on an invariant violation
    Failed,
}

impl RunPhase {
    /// Running or paused
    pub fn is_active(self) -> bool {
        matches!(self, RunPhase::Running | RunPhase::Paused)
    }

    /// Completed, cancelled or failed
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Cancelled | RunPhase::Failed
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Paused => "paused",
            RunPhase::Completed => "completed",
            RunPhase::Cancelled => "cancelled",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// Disk count outside `1..=max`
    InvalidDiskCount {
        /// Requested count
        n: u32,
        /// Configured maximum
        max: u8,
    },
    /// Configuration failed validation
    InvalidConfig {
        /// Every problem found
        errors: Vec<String>,
    },
    /// A move broke the puzzle rules
    Puzzle(PuzzleError),
    /// The worker thread could not be started
    Spawn {
        /// OS error message
        message: String,
    },
    /// The worker thread panicked
    WorkerPanicked {
        /// Run whose worker died
        run_id: u64,
    },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::InvalidDiskCount { n, max } => {
                write!(f, "Invalid number of disks {}: must be 1-{}", n, max)
            }
            ControllerError::InvalidConfig { errors } => {
                write!(f, "Invalid config: {}", errors.join("; "))
            }
            ControllerError::Puzzle(e) => write!(f, "Internal error: {}", e),
            ControllerError::Spawn { message } => {
                write!(f, "Failed to start worker: {}", message)
            }
            ControllerError::WorkerPanicked { run_id } => {
                write!(f, "Worker for run {} panicked", run_id)
            }
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::Puzzle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PuzzleError> for ControllerError {
    fn from(e: PuzzleError) -> Self {
        ControllerError::Puzzle(e)
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: u64,
    pub n_disks: u8,
    pub algorithm: Algorithm,
    /// `Completed` or `Cancelled`
    pub phase: RunPhase,
    /// Moves applied before the run ended
    pub moves_applied: u64,
    /// Moves in the full solution
    pub total_moves: u64,
    /// Wall-clock time including any pauses
    pub elapsed: Duration,
    /// Puzzle when the run ended
    pub final_state: PuzzleState,
}

impl RunReport {
    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == RunPhase::Completed
    }
}

/// Peg roles and pacing for one run
#[derive(Debug, Clone, Copy)]
struct RunPlan {
    algorithm: Algorithm,
    n_disks: u8,
    source: PegId,
    target: PegId,
    auxiliary: PegId,
    frame_interval: Duration,
}

/// State owned by exactly one run
struct RunShared {
    id: u64,
    n_disks: u8,
    algorithm: Algorithm,
    state: Mutex<PuzzleState>,
    phase: Mutex<RunPhase>,
    gate: PauseGate,
    cancel: CancellationToken,
    applied: AtomicU64,
    bus: EventBus,
}

impl RunShared {
    fn new(id: u64, state: PuzzleState, algorithm: Algorithm, phase: RunPhase, bus: EventBus) -> Self {
        Self {
            id,
            n_disks: state.n_disks(),
            algorithm,
            state: Mutex::new(state),
            phase: Mutex::new(phase),
            gate: PauseGate::new(),
            cancel: CancellationToken::new(),
            applied: AtomicU64::new(0),
            bus,
        }
    }

    fn phase(&self) -> RunPhase {
        *lock(&self.phase)
    }

    fn snapshot(&self) -> PuzzleState {
        lock(&self.state).clone()
    }

    fn moves_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    fn pause(&self) -> bool {
        let mut phase = lock(&self.phase);
        // A cancelled run must keep its gate open until the worker exits
        if *phase != RunPhase::Running || self.cancel.is_cancelled() {
            return false;
        }
        *phase = RunPhase::Paused;
        self.gate.close();
        debug!(run_id = self.id, "Run paused");
        self.bus
            .emit(HanoiEvent::run_paused(self.id, self.moves_applied()));
        true
    }

    fn resume(&self) -> bool {
        let mut phase = lock(&self.phase);
        if *phase != RunPhase::Paused || self.cancel.is_cancelled() {
            return false;
        }
        *phase = RunPhase::Running;
        self.gate.open();
        debug!(run_id = self.id, "Run resumed");
        self.bus
            .emit(HanoiEvent::run_resumed(self.id, self.moves_applied()));
        true
    }

    /// Signal cancellation and release a paused worker
    ///
    /// Runs under the phase lock so a racing `pause` either happens first
    /// (and is undone here) or sees the token and refuses.
    fn cancel(&self) -> bool {
        let guard = lock(&self.phase);
        let phase = *guard;
        if !phase.is_active() || self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        self.gate.open();
        drop(guard);
        debug!(run_id = self.id, phase = %phase, "Cancellation requested");
        true
    }

    fn finish(&self, phase: RunPhase) {
        *lock(&self.phase) = phase;
    }
}

type WorkerResult = Result<RunReport, ControllerError>;
type WorkerBody = Box<dyn FnOnce() -> WorkerResult + Send>;
type Spawner = fn(String, WorkerBody) -> io::Result<thread::JoinHandle<WorkerResult>>;

/// Start a run's worker on a named OS thread
fn spawn_worker(name: String, body: WorkerBody) -> io::Result<thread::JoinHandle<WorkerResult>> {
    thread::Builder::new().name(name).spawn(body)
}

// Poison is ignored: a panicking worker is reported through `join`
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to a started run
///
/// Dropping the handle detaches the worker; it keeps running until it
/// completes or is cancelled.
pub struct RunHandle {
    shared: Arc<RunShared>,
    worker: thread::JoinHandle<WorkerResult>,
}

impl RunHandle {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.shared.algorithm
    }

    /// Block the worker before its next move
    ///
    /// Returns `false` if the run was not running.
    pub fn pause(&self) -> bool {
        self.shared.pause()
    }

    /// Release a paused worker
    pub fn resume(&self) -> bool {
        self.shared.resume()
    }

    /// Stop the run at its next move boundary
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub fn phase(&self) -> RunPhase {
        self.shared.phase()
    }

    /// Copy of the run's puzzle
    pub fn snapshot(&self) -> PuzzleState {
        self.shared.snapshot()
    }

    pub fn moves_applied(&self) -> u64 {
        self.shared.moves_applied()
    }

    pub fn total_moves(&self) -> u64 {
        move_count(self.shared.n_disks)
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and collect its report
    pub fn join(self) -> Result<RunReport, ControllerError> {
        let run_id = self.shared.id;
        self.worker
            .join()
            .unwrap_or(Err(ControllerError::WorkerPanicked { run_id }))
    }
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("id", &self.shared.id)
            .field("phase", &self.phase())
            .field("moves_applied", &self.moves_applied())
            .finish()
    }
}

/// Control surface for animated solving
///
/// Owned by the UI context. Moves are applied on a worker thread and reach
/// the UI only through the presentation sink.
pub struct Controller {
    config: ControllerConfig,
    bus: EventBus,
    sink: Arc<dyn PresentationSink>,
    n_disks: u8,
    algorithm: Algorithm,
    next_run_id: u64,
    session: Arc<RunShared>,
    spawner: Spawner,
}

impl Controller {
    /// Create a controller with a fresh idle puzzle of `default_disks`
    ///
    /// The event bus doubles as the presentation sink until
    /// [`Controller::with_sink`] replaces it.
    pub fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        config
            .validate()
            .map_err(|errors| ControllerError::InvalidConfig { errors })?;

        let bus = EventBus::new(config.event_capacity);
        let n_disks = config.default_disks;
        let algorithm = config.algorithm;
        let state = PuzzleState::all_on(n_disks, config.source)?;
        let session = Arc::new(RunShared::new(0, state, algorithm, RunPhase::Idle, bus.clone()));

        Ok(Self {
            sink: Arc::new(bus.clone()),
            config,
            bus,
            n_disks,
            algorithm,
            next_run_id: 1,
            session,
            spawner: spawn_worker,
        })
    }

    /// Replace the presentation sink
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Bus carrying lifecycle events
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn disk_count(&self) -> u8 {
        self.n_disks
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Cancel any active run and reset to a fresh puzzle of `n` disks
    ///
    /// Zero disks is accepted here (an empty puzzle); [`Controller::start`]
    /// rejects it.
    pub fn set_disk_count(&mut self, n: u32) -> Result<(), ControllerError> {
        let n_disks = self.check_disk_count(n, 0)?;
        self.session.cancel();

        let state = PuzzleState::all_on(n_disks, self.config.source)?;
        self.n_disks = n_disks;
        self.session = Arc::new(RunShared::new(
            0,
            state,
            self.algorithm,
            RunPhase::Idle,
            self.bus.clone(),
        ));
        self.bus.emit(HanoiEvent::state_reset(n_disks));
        Ok(())
    }

    /// Choose the generator for subsequent runs
    pub fn select_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    /// Start an animated run on a fresh puzzle
    ///
    /// Any active run is cancelled once the new worker is up. Fails
    /// synchronously, without creating a run, when the disk count is zero
    /// or the worker cannot be spawned; the previous run is then untouched.
    pub fn start(&mut self) -> Result<RunHandle, ControllerError> {
        let n_disks = self.check_disk_count(u32::from(self.n_disks), 1)?;
        let run_id = self.next_run_id;

        let state = PuzzleState::all_on(n_disks, self.config.source)?;
        let shared = Arc::new(RunShared::new(
            run_id,
            state,
            self.algorithm,
            RunPhase::Running,
            self.bus.clone(),
        ));
        let plan = RunPlan {
            algorithm: self.algorithm,
            n_disks,
            source: self.config.source,
            target: self.config.target,
            auxiliary: self.config.auxiliary,
            frame_interval: self.config.frame_interval(),
        };

        // Hold the worker before its first move until the run is announced
        shared.gate.close();
        let worker = {
            let shared = Arc::clone(&shared);
            let sink = Arc::clone(&self.sink);
            (self.spawner)(
                format!("hanoi-run-{}", run_id),
                Box::new(move || run_worker(&shared, sink.as_ref(), plan)),
            )
            .map_err(|e| ControllerError::Spawn {
                message: e.to_string(),
            })?
        };
        self.next_run_id += 1;

        // Previous run: cancel and open its gate so a paused worker can exit
        self.session.cancel();

        self.bus.emit(HanoiEvent::run_started(
            run_id,
            n_disks,
            plan.algorithm,
            move_count(n_disks),
        ));
        shared.gate.open();

        info!(
            run_id = run_id,
            disks = n_disks,
            algorithm = %plan.algorithm,
            "Run started"
        );

        self.session = Arc::clone(&shared);
        Ok(RunHandle { shared, worker })
    }

    /// Pause the active run
    pub fn pause(&self) -> bool {
        self.session.pause()
    }

    /// Resume the active run
    pub fn resume(&self) -> bool {
        self.session.resume()
    }

    /// Cancel the active run
    pub fn cancel(&self) -> bool {
        self.session.cancel()
    }

    /// Phase of the current (most recent) run
    pub fn phase(&self) -> RunPhase {
        self.session.phase()
    }

    /// Copy of the current puzzle
    pub fn snapshot(&self) -> PuzzleState {
        self.session.snapshot()
    }

    pub fn moves_applied(&self) -> u64 {
        self.session.moves_applied()
    }

    /// Time the current algorithm on a detached puzzle
    ///
    /// Never touches the puzzle shown by the UI.
    pub fn run_headless(&self) -> Result<HeadlessReport, ControllerError> {
        let n_disks = self.check_disk_count(u32::from(self.n_disks), 1)?;
        let report = run_headless(
            self.algorithm,
            n_disks,
            self.config.source,
            self.config.target,
            self.config.auxiliary,
        )?;

        self.bus.emit(HanoiEvent::headless_completed(
            n_disks,
            report.algorithm,
            report.moves,
            report.elapsed_ms(),
        ));
        Ok(report)
    }

    fn check_disk_count(&self, n: u32, min: u32) -> Result<u8, ControllerError> {
        let max = self.config.max_disks;
        if n < min || n > u32::from(max) {
            return Err(ControllerError::InvalidDiskCount { n, max });
        }
        u8::try_from(n).map_err(|_| ControllerError::InvalidDiskCount { n, max })
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("n_disks", &self.n_disks)
            .field("algorithm", &self.algorithm)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Body of the worker thread for one run
fn run_worker(
    shared: &RunShared,
    sink: &dyn PresentationSink,
    plan: RunPlan,
) -> Result<RunReport, ControllerError> {
    let mut failure: Option<PuzzleError> = None;
    let mut timing = Timing::started();

    let flow = plan.algorithm.solve(
        plan.n_disks,
        plan.source,
        plan.target,
        plan.auxiliary,
        &mut |mv| {
            shared.gate.wait_open();
            if shared.cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let (disk, snapshot) = {
                let mut state = lock(&shared.state);
                match state.apply(mv) {
                    Ok(disk) => (disk, state.clone()),
                    Err(e) => {
                        failure = Some(e);
                        return ControlFlow::Break(());
                    }
                }
            };
            let step = shared.applied.fetch_add(1, Ordering::SeqCst) + 1;
            let applied = AppliedMove {
                step,
                disk,
                from: mv.from,
                to: mv.to,
            };

            sink.on_state_changed(shared.id, &applied, &snapshot);
            if !plan.frame_interval.is_zero() {
                thread::sleep(plan.frame_interval);
            }
            ControlFlow::Continue(())
        },
    );

    let elapsed = timing.stop().unwrap_or_default();
    let moves_applied = shared.moves_applied();

    if let Some(e) = failure {
        error!(
            run_id = shared.id,
            moves_applied = moves_applied,
            error = %e,
            "Invariant violation, run aborted"
        );
        shared.finish(RunPhase::Failed);
        shared
            .bus
            .emit(HanoiEvent::run_failed(shared.id, moves_applied, &e.to_string()));
        return Err(ControllerError::Puzzle(e));
    }

    let phase = match flow {
        ControlFlow::Continue(()) => RunPhase::Completed,
        ControlFlow::Break(()) => RunPhase::Cancelled,
    };
    shared.finish(phase);

    let elapsed_ms = duration_ms(elapsed);
    let event = match phase {
        RunPhase::Completed => HanoiEvent::run_completed(shared.id, moves_applied, elapsed_ms),
        _ => HanoiEvent::run_cancelled(shared.id, moves_applied, elapsed_ms),
    };
    shared.bus.emit(event);

    Ok(RunReport {
        run_id: shared.id,
        n_disks: plan.n_disks,
        algorithm: plan.algorithm,
        phase,
        moves_applied,
        total_moves: move_count(plan.n_disks),
        elapsed,
        final_state: shared.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Move;
    use crate::events::NullSink;
    use std::time::Instant;

    /// Sink that records every applied move
    #[derive(Default)]
    struct RecordingSink {
        moves: Mutex<Vec<Move>>,
    }

    impl PresentationSink for RecordingSink {
        fn on_state_changed(&self, _run_id: u64, applied: &AppliedMove, snapshot: &PuzzleState) {
            assert!(snapshot.check_invariants().is_ok());
            lock(&self.moves).push(applied.as_move());
        }
    }

    fn fast_config() -> ControllerConfig {
        ControllerConfig::default().with_frame_interval(Duration::ZERO)
    }

    fn slow_config() -> ControllerConfig {
        ControllerConfig::default().with_frame_interval(Duration::from_millis(5))
    }

    /// Poll until `cond` holds or two seconds pass
    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    /// Join on a side thread, giving up after two seconds
    fn join_within_timeout(handle: RunHandle) -> Option<WorkerResult> {
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(handle.join());
        });
        rx.recv_timeout(Duration::from_secs(2)).ok()
    }

    fn failing_spawner(_name: String, _body: WorkerBody) -> io::Result<thread::JoinHandle<WorkerResult>> {
        Err(io::Error::other("thread limit reached"))
    }

    // ==========================================
    // Construction Tests
    // ==========================================

    #[test]
    fn test_new_controller_is_idle_with_default_disks() {
        let controller = Controller::new(fast_config()).unwrap();
        assert_eq!(controller.phase(), RunPhase::Idle);
        assert_eq!(controller.disk_count(), 3);
        assert_eq!(controller.snapshot().peg(PegId::A), &[3, 2, 1]);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ControllerConfig {
            max_disks: 0,
            default_disks: 0,
            ..Default::default()
        };
        assert!(matches!(
            Controller::new(config),
            Err(ControllerError::InvalidConfig { .. })
        ));
    }

    // ==========================================
    // Validation Tests
    // ==========================================

    #[test]
    fn test_start_rejects_zero_disks() {
        let mut controller = Controller::new(fast_config()).unwrap();
        controller.set_disk_count(0).unwrap();

        let err = controller.start().unwrap_err();
        assert_eq!(err, ControllerError::InvalidDiskCount { n: 0, max: 20 });
        assert_eq!(controller.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_set_disk_count_rejects_above_max() {
        let mut controller = Controller::new(fast_config()).unwrap();
        assert_eq!(
            controller.set_disk_count(21),
            Err(ControllerError::InvalidDiskCount { n: 21, max: 20 })
        );
        assert_eq!(controller.disk_count(), 3);
    }

    #[test]
    fn test_zero_disk_state_is_empty() {
        let mut controller = Controller::new(fast_config()).unwrap();
        controller.set_disk_count(0).unwrap();
        assert!(controller.snapshot().pegs().iter().all(Vec::is_empty));
    }

    // ==========================================
    // Run Tests
    // ==========================================

    #[test]
    fn test_run_completes_and_solves() {
        let mut controller = Controller::new(fast_config()).unwrap();
        controller.set_disk_count(5).unwrap();

        let report = controller.start().unwrap().join().unwrap();

        assert_eq!(report.phase, RunPhase::Completed);
        assert_eq!(report.moves_applied, 31);
        assert_eq!(report.total_moves, 31);
        assert!(report.final_state.is_solved_on(PegId::C));
        assert_eq!(controller.phase(), RunPhase::Completed);
        assert_eq!(controller.snapshot(), report.final_state);
    }

    #[test]
    fn test_sink_sees_generator_order() {
        for algorithm in Algorithm::ALL {
            let sink = Arc::new(RecordingSink::default());
            let mut controller = Controller::new(fast_config())
                .unwrap()
                .with_sink(sink.clone());
            controller.set_disk_count(4).unwrap();
            controller.select_algorithm(algorithm);

            controller.start().unwrap().join().unwrap();

            let expected =
                crate::core::solver::moves(algorithm, 4, PegId::A, PegId::C, PegId::B);
            assert_eq!(*lock(&sink.moves), expected);
        }
    }

    #[test]
    fn test_events_bracket_the_run() {
        let mut controller = Controller::new(fast_config()).unwrap();
        let mut rx = controller.events().subscribe();

        controller.start().unwrap().join().unwrap();

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type());
        }
        assert_eq!(types.first(), Some(&"RunStarted"));
        assert_eq!(types.last(), Some(&"RunCompleted"));
        assert_eq!(types.iter().filter(|t| **t == "MoveApplied").count(), 7);
    }

    // ==========================================
    // Pause / Resume Tests
    // ==========================================

    #[test]
    fn test_pause_freezes_state_until_resume() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(6).unwrap();
        let handle = controller.start().unwrap();

        assert!(wait_until(|| handle.moves_applied() >= 2));
        assert!(handle.pause());
        assert_eq!(handle.phase(), RunPhase::Paused);

        // Let an in-flight move land, then the count must hold still
        thread::sleep(Duration::from_millis(30));
        let frozen = handle.moves_applied();
        let frozen_state = handle.snapshot();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(handle.moves_applied(), frozen);
        assert_eq!(handle.snapshot(), frozen_state);

        assert!(handle.resume());
        let report = handle.join().unwrap();
        assert_eq!(report.phase, RunPhase::Completed);
        assert_eq!(report.moves_applied, 63);
    }

    #[test]
    fn test_pause_when_not_running_is_noop() {
        let controller = Controller::new(fast_config()).unwrap();
        assert!(!controller.pause());
        assert!(!controller.resume());
        assert!(!controller.cancel());
    }

    // ==========================================
    // Cancellation Tests
    // ==========================================

    #[test]
    fn test_cancel_stops_mid_run() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(10).unwrap();
        let handle = controller.start().unwrap();

        assert!(wait_until(|| handle.moves_applied() >= 3));
        assert!(controller.cancel());
        let report = handle.join().unwrap();

        assert_eq!(report.phase, RunPhase::Cancelled);
        assert!(report.moves_applied < report.total_moves);
        assert!(report.final_state.check_invariants().is_ok());
        assert_eq!(controller.phase(), RunPhase::Cancelled);
    }

    #[test]
    fn test_cancel_releases_paused_worker() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(8).unwrap();
        let handle = controller.start().unwrap();

        assert!(wait_until(|| handle.moves_applied() >= 1));
        assert!(handle.pause());
        assert!(handle.cancel());

        let report = handle.join().unwrap();
        assert_eq!(report.phase, RunPhase::Cancelled);
    }

    #[test]
    fn test_pause_after_cancel_is_refused() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(10).unwrap();
        let mut rx = controller.events().subscribe();
        let handle = controller.start().unwrap();

        assert!(wait_until(|| handle.moves_applied() >= 1));
        assert!(handle.cancel());
        assert!(!handle.pause());
        assert!(!handle.resume());
        assert!(!handle.cancel());

        let report = join_within_timeout(handle)
            .expect("worker should exit after cancel")
            .unwrap();
        assert_eq!(report.phase, RunPhase::Cancelled);
        assert_eq!(controller.phase(), RunPhase::Cancelled);

        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(
                event,
                HanoiEvent::RunPaused { .. } | HanoiEvent::RunResumed { .. }
            ));
        }
    }

    #[test]
    fn test_cancel_while_paused_then_pause_again() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(10).unwrap();
        let handle = controller.start().unwrap();

        assert!(wait_until(|| handle.moves_applied() >= 1));
        assert!(controller.pause());
        assert!(controller.cancel());
        assert!(!controller.pause());
        assert!(!controller.resume());

        let report = join_within_timeout(handle)
            .expect("paused worker should exit after cancel")
            .unwrap();
        assert_eq!(report.phase, RunPhase::Cancelled);
    }

    #[test]
    fn test_restart_cancels_previous_run() {
        let mut controller = Controller::new(slow_config()).unwrap().with_sink(Arc::new(NullSink));
        controller.set_disk_count(10).unwrap();

        let first = controller.start().unwrap();
        assert!(wait_until(|| first.moves_applied() >= 1));
        first.pause();

        let second = controller.start().unwrap();
        let first_report = first.join().unwrap();
        assert_eq!(first_report.phase, RunPhase::Cancelled);
        assert_ne!(first_report.run_id, second.id());

        // The new run starts from a fresh puzzle, not the old partial one
        assert_eq!(second.phase(), RunPhase::Running);
        second.cancel();
        let second_report = second.join().unwrap();
        assert!(second_report.final_state.check_invariants().is_ok());
    }

    #[test]
    fn test_set_disk_count_cancels_run_and_resets() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(10).unwrap();
        let handle = controller.start().unwrap();
        assert!(wait_until(|| handle.moves_applied() >= 1));

        controller.set_disk_count(4).unwrap();

        assert_eq!(handle.join().unwrap().phase, RunPhase::Cancelled);
        assert_eq!(controller.phase(), RunPhase::Idle);
        assert_eq!(controller.snapshot(), PuzzleState::new(4).unwrap());
    }

    #[test]
    fn test_failed_spawn_leaves_previous_run_alone() {
        let mut controller = Controller::new(slow_config()).unwrap();
        controller.set_disk_count(10).unwrap();
        let first = controller.start().unwrap();
        assert!(wait_until(|| first.moves_applied() >= 1));

        let mut rx = controller.events().subscribe();
        controller.spawner = failing_spawner;
        let err = controller.start().unwrap_err();
        assert!(matches!(err, ControllerError::Spawn { .. }));

        // No run was announced and the first run keeps going
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, HanoiEvent::RunStarted { .. }));
        }
        assert_eq!(first.phase(), RunPhase::Running);
        assert_eq!(controller.phase(), RunPhase::Running);

        controller.spawner = spawn_worker;
        let second = controller.start().unwrap();
        assert_eq!(second.id(), first.id() + 1);
        assert_eq!(first.join().unwrap().phase, RunPhase::Cancelled);
        second.cancel();
        second.join().unwrap();
    }

    #[test]
    fn test_run_started_precedes_first_move() {
        let mut controller = Controller::new(fast_config()).unwrap();
        let mut rx = controller.events().subscribe();

        controller.start().unwrap().join().unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.event_type(), "RunStarted");
    }

    // ==========================================
    // Headless Tests
    // ==========================================

    #[test]
    fn test_headless_does_not_touch_live_state() {
        let mut controller = Controller::new(fast_config()).unwrap();
        controller.set_disk_count(6).unwrap();
        let before = controller.snapshot();

        let report = controller.run_headless().unwrap();

        assert_eq!(report.moves, 63);
        assert!(report.final_state.is_solved_on(PegId::C));
        assert_eq!(controller.snapshot(), before);
        assert_eq!(controller.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_headless_rejects_zero_disks() {
        let mut controller = Controller::new(fast_config()).unwrap();
        controller.set_disk_count(0).unwrap();
        assert!(matches!(
            controller.run_headless(),
            Err(ControllerError::InvalidDiskCount { n: 0, .. })
        ));
    }

    // ==========================================
    // Failure Tests
    // ==========================================

    #[test]
    fn test_illegal_plan_fails_run() {
        let mut config = fast_config();
        // Misconfigured peg roles bypassing validation
        config.auxiliary = PegId::C;
        let mut controller = Controller {
            config,
            ..Controller::new(fast_config()).unwrap()
        };
        controller.set_disk_count(2).unwrap();

        let err = controller.start().unwrap().join().unwrap_err();
        assert!(matches!(err, ControllerError::Puzzle(_)));
        assert_eq!(controller.phase(), RunPhase::Failed);
    }

    #[test]
    fn test_error_display() {
        let err = ControllerError::InvalidDiskCount { n: 0, max: 20 };
        assert_eq!(err.to_string(), "Invalid number of disks 0: must be 1-20");
    }
}
