//! Cooperative control signals shared between the UI and a run's worker
//!
//! - [`CancellationToken`]: one-way flag checked at every move boundary
//! - [`PauseGate`]: blocking gate the worker waits on before each move

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Cancellation token for a single run
///
/// Clones share the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Open/closed gate with blocking waits
///
/// The worker calls [`PauseGate::wait_open`] before each move. While the
/// gate is closed the worker sleeps on a condition variable; opening the
/// gate wakes every waiter.
#[derive(Debug)]
pub struct PauseGate {
    closed: Mutex<bool>,
    opened: Condvar,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self {
            closed: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    /// Close the gate; subsequent waits block
    pub fn close(&self) {
        *self.lock() = true;
    }

    /// Open the gate and wake all waiters
    pub fn open(&self) {
        *self.lock() = false;
        self.opened.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        *self.lock()
    }

    /// Block until the gate is open
    pub fn wait_open(&self) {
        let guard = self.lock();
        let _guard = self
            .opened
            .wait_while(guard, |closed| *closed)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }

    /// Block until the gate is open or `timeout` elapses
    ///
    /// Returns `true` if the gate was open on return.
    pub fn wait_open_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .opened
            .wait_timeout_while(guard, timeout, |closed| *closed)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !*guard
    }

    // Poison is ignored: the guarded bool is always consistent
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.closed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
