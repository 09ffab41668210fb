//! Buffer and Queue Capacities
//!
//! Every collection in the engine has a fixed capacity chosen here, so
//! memory use is bounded regardless of input rate.

/// Finalized minute buckets kept per channel.
///
/// 59 finalized buckets plus the in-progress minute give one hour of
/// minute-resolution history, which is what the dashboard trend panes show.
pub const HISTORY_CAPACITY: usize = 59;

/// Maximum points handed to the rate estimator.
///
/// Full history plus the appended live point.
pub const RATE_POINTS_MAX: usize = HISTORY_CAPACITY + 1;

/// Default input event queue depth.
///
/// Sized for a burst of one reading per channel per second for ten seconds;
/// beyond that the configured backpressure strategy applies.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Outbound update queue depth.
///
/// Bucket-closed notifications awaiting the presentation collaborator. At
/// most one bucket per channel closes per minute, so 32 gives several
/// minutes of slack before the oldest notification is shed.
pub const UPDATE_QUEUE_DEPTH: usize = 32;
