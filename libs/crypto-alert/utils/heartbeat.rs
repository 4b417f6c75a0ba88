//! Heartbeat logging for the long-running monitor

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Tracks when the next periodic status line is due.
///
/// An interval of zero disables the heartbeat.
pub struct Heartbeat {
    interval: Duration,
    last_beat: DateTime<Utc>,
    beats: u64,
}

impl Heartbeat {
    /// Create a new heartbeat with the given interval in seconds
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            last_beat: Utc::now(),
            beats: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Check if enough time has passed since the last beat
    pub fn should_beat(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let elapsed = Utc::now().signed_duration_since(self.last_beat);
        elapsed.to_std().unwrap_or_default() >= self.interval
    }

    /// Record a heartbeat at the current time
    pub fn beat(&mut self) {
        self.last_beat = Utc::now();
        self.beats += 1;
    }

    /// Beat if due; returns whether a status line should be written now
    pub fn poll(&mut self) -> bool {
        if self.should_beat() {
            self.beat();
            true
        } else {
            false
        }
    }

    /// Number of beats recorded so far
    pub fn beats(&self) -> u64 {
        self.beats
    }
}
