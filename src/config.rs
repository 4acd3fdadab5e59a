//! Controller Configuration
//!
//! Defaults for disk count, algorithm, peg roles and animation pacing.
//! A configuration can be loaded from a JSON file; missing fields fall back
//! to their defaults.

use crate::core::solver::Algorithm;
use crate::core::state::{PegId, HARD_MAX_DISKS};
use crate::events::bus::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration with defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Disk count used when none is given
    pub default_disks: u8,
    /// Largest disk count `start()` accepts
    pub max_disks: u8,
    /// Default move generator
    pub algorithm: Algorithm,
    /// Peg holding every disk at the start of a run
    pub source: PegId,
    /// Peg every disk ends on
    pub target: PegId,
    /// Spare peg
    pub auxiliary: PegId,
    /// Pause between visual refreshes, in milliseconds (0 disables pacing)
    pub frame_interval_ms: u64,
    /// Event bus buffer size
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_disks: 3,
            max_disks: 20,
            algorithm: Algorithm::Recursive,
            source: PegId::A,
            target: PegId::C,
            auxiliary: PegId::B,
            frame_interval_ms: 10,
            event_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Set the pause between frames, saturating at `u64::MAX` milliseconds
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the default algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the default disk count
    pub fn with_default_disks(mut self, n: u8) -> Self {
        self.default_disks = n;
        self
    }

    /// Set source and target pegs; the auxiliary peg is the remaining one
    pub fn with_pegs(mut self, source: PegId, target: PegId) -> Self {
        self.source = source;
        self.target = target;
        if let Some(aux) = source.third(target) {
            self.auxiliary = aux;
        }
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Check every field, collecting all problems
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_disks == 0 {
            errors.push("max_disks must be >= 1".to_string());
        }

        if self.max_disks > HARD_MAX_DISKS {
            errors.push(format!(
                "max_disks ({}) must be <= {}",
                self.max_disks, HARD_MAX_DISKS
            ));
        }

        if self.default_disks > self.max_disks {
            errors.push(format!(
                "default_disks ({}) must be <= max_disks ({})",
                self.default_disks, self.max_disks
            ));
        }

        if self.source == self.target
            || self.source == self.auxiliary
            || self.target == self.auxiliary
        {
            errors.push(format!(
                "source ({}), target ({}) and auxiliary ({}) must be distinct pegs",
                self.source, self.target, self.auxiliary
            ));
        }

        if self.event_capacity == 0 {
            errors.push("event_capacity must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
