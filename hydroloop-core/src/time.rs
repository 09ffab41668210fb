//! Time handling for the telemetry engine
//!
//! Readings arrive stamped by their producers; the engine itself only needs
//! a clock for staleness checks and for the snapshot "now". The `TimeSource`
//! trait abstracts over the wall clock so tests can pin time exactly.

use crate::constants::time::MS_PER_MINUTE;

/// Timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Floor a timestamp to the start of its minute.
///
/// This is the bucket key of the minute aggregator: every reading inside
/// the same wall-clock minute maps to the same key.
pub const fn minute_floor(ts: Timestamp) -> Timestamp {
    ts - ts % MS_PER_MINUTE
}

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock pinned to `timestamp`.
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Pin the clock to a new timestamp.
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
