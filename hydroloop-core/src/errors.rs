//! Error types for the telemetry engine
//!
//! The engine never raises for bad *data*: malformed or out-of-order
//! samples are dropped and reported through [`IngestOutcome`]
//! (`crate::aggregate::IngestOutcome`), and a derived value whose inputs
//! are missing is an absent `Option`, never an error. The variants here
//! cover API misuse and resource exhaustion only: the cases a caller can
//! actually fix.
//!
//! Errors are small and `Copy`: they are returned on hot paths and carry
//! only inline data, no heap.

use thiserror_no_std::Error;

/// Result type for engine operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Engine errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// Seeding was attempted after live ingestion had already begun.
    /// Appending persisted history behind live buckets would violate the
    /// ordering invariant.
    #[error("history already live: seed must run before the first ingest")]
    SeedAfterIngest,

    /// A second seed was attempted; histories cannot be interleaved.
    #[error("history already seeded")]
    AlreadySeeded,

    /// Seed buckets were not strictly ordered by minute.
    #[error("seed buckets out of order at index {index}")]
    SeedUnordered {
        /// Index of the first bucket that does not follow its predecessor
        index: usize,
    },

    /// The input event queue is full and the backpressure strategy is
    /// [`Backpressure::Reject`](crate::hub::Backpressure::Reject).
    #[error("event queue full")]
    QueueFull,
}
