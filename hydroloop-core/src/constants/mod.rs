//! Constants for the hydroloop core
//!
//! Centralized, documented constants used throughout the engine. All numeric
//! values live here (or in the config structs that default from here) so the
//! model logic contains no magic numbers.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Time**: unit conversions, aggregation windows, staleness limits
//! - **Thermal**: physical/empirical coefficients of the heating loop
//! - **Display**: thresholds of the rate rendering contract
//! - **Buffers**: history and queue capacities

/// Time unit conversions, aggregation windows, and staleness limits.
pub mod time;

/// Physical and empirical coefficients of the shed heating loop.
pub mod thermal;

/// Thresholds for the rate-of-change display contract.
pub mod display;

/// History and queue capacities.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use time::{MS_PER_MINUTE, MS_PER_HOUR, MINUTES_PER_HOUR, STALE_AFTER_MS};
pub use buffers::{HISTORY_CAPACITY, RATE_POINTS_MAX};
pub use thermal::HEATER_RATED_POWER_W;
