//! Time-Related Constants
//!
//! Unit conversions and the timing parameters of the aggregation pipeline.
//! Timestamps throughout the engine are milliseconds since the Unix epoch.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE as u64;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * MINUTES_PER_HOUR as u64;

// ===== AGGREGATION WINDOWS =====

/// Aggregation bucket width (milliseconds).
///
/// One minute is the resolution of the historical record: wide enough to
/// smooth sensor jitter, narrow enough to show the loop responding to the
/// heater and pump cycling.
pub const BUCKET_WIDTH_MS: u64 = MS_PER_MINUTE;

/// Default rate-of-change lookback (buckets).
///
/// The rate estimator compares the freshest point against the point this
/// many buckets earlier. Five minutes of baseline keeps single-bucket noise
/// out of the gradient while still reacting within one heater cycle.
pub const DEFAULT_LOOKBACK_BUCKETS: usize = 5;

/// Default loop transit time (minutes).
///
/// Water injected at the loop supply reaches the return sensor roughly this
/// many minutes later at normal pump flow. Used to pair a past supply
/// temperature with the present return temperature.
pub const DEFAULT_TRANSIT_MINUTES: u32 = 3;

// ===== STALENESS =====

/// Age after which a live value is flagged stale (milliseconds).
///
/// Sensors report at least once a minute in normal operation; five minutes
/// of silence means the reading no longer describes the present loop state
/// and the dashboard should say so instead of showing a number.
pub const STALE_AFTER_MS: u64 = 5 * MS_PER_MINUTE;
