//! Minute Aggregation of Irregular Reading Streams
//!
//! ## Overview
//!
//! One `MinuteAggregator` per channel turns an unbounded stream of
//! `(value, timestamp)` readings into:
//!
//! - finalized [`MinuteBucket`]s (avg/min/max/count per wall-clock minute)
//!   kept in a bounded, chronologically ordered [`BucketRing`],
//! - a continuously updated [`LivePoint`]: the running average of the
//!   minute still in progress.
//!
//! ## Bucket boundaries
//!
//! Buckets are keyed by the reading's minute (`minute_floor`). A reading
//! whose key differs from the open bucket's key closes that bucket: the
//! accumulated samples are summarized, the bucket is appended to history
//! (evicting the oldest when at capacity), and a new bucket opens seeded
//! with the triggering sample. A minute with no readings simply produces
//! no bucket; consumers must treat the missing slot as a gap, not
//! interpolate.
//!
//! ## Failure semantics
//!
//! Ingestion never fails. Non-finite values are dropped without touching
//! the open bucket. A reading whose minute is *earlier* than the open
//! bucket (late delivery) is dropped rather than reopening a finalized
//! bucket; the dispatch layer logs these. Both cases are reported through
//! [`IngestOutcome`] so the hub can count them.

use crate::{
    errors::{TelemetryError, TelemetryResult},
    history::BucketRing,
    time::{minute_floor, Timestamp},
};

/// A finalized one-minute summary of one channel
///
/// Immutable once appended to history.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinuteBucket {
    /// Minute-aligned start of the bucket (ms since epoch)
    pub minute_start: Timestamp,
    /// Mean of the samples in this minute
    pub avg: f32,
    /// Smallest sample in this minute
    pub min: f32,
    /// Largest sample in this minute
    pub max: f32,
    /// Number of samples aggregated
    pub sample_count: u32,
}

/// The running state of the minute still in progress
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LivePoint {
    /// Minute-aligned start of the open bucket
    pub minute_start: Timestamp,
    /// Running average of the accumulated samples
    pub value: f32,
    /// Samples accumulated so far
    pub sample_count: u32,
    /// Timestamp of the most recent sample
    pub last_update: Timestamp,
}

/// Result of one ingest call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    /// Sample accumulated; `closed` carries the finalized bucket when this
    /// sample crossed a minute boundary
    Accepted {
        /// Bucket finalized by the boundary crossing, if any
        closed: Option<MinuteBucket>,
    },
    /// Sample dropped: value was NaN or infinite
    DroppedNonFinite,
    /// Sample dropped: its minute precedes the open bucket. Finalized
    /// buckets are never reopened.
    DroppedStale {
        /// Minute key of the bucket currently open
        open_minute: Timestamp,
    },
}

/// Accumulator for the open minute
#[derive(Debug, Clone, Copy)]
struct OpenBucket {
    minute_start: Timestamp,
    sum: f32,
    min: f32,
    max: f32,
    count: u32,
    last_update: Timestamp,
}

impl OpenBucket {
    fn seeded(minute_start: Timestamp, value: f32, timestamp: Timestamp) -> Self {
        Self {
            minute_start,
            sum: value,
            min: value,
            max: value,
            count: 1,
            last_update: timestamp,
        }
    }

    fn accumulate(&mut self, value: f32, timestamp: Timestamp) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        self.last_update = timestamp;
    }

    fn finalize(&self) -> MinuteBucket {
        MinuteBucket {
            minute_start: self.minute_start,
            avg: self.sum / self.count as f32,
            min: self.min,
            max: self.max,
            sample_count: self.count,
        }
    }

    fn live_point(&self) -> LivePoint {
        LivePoint {
            minute_start: self.minute_start,
            value: self.sum / self.count as f32,
            sample_count: self.count,
            last_update: self.last_update,
        }
    }
}

/// Per-channel minute aggregator
///
/// Owns the channel's entire mutable state: the bounded history ring and
/// the open bucket. No two aggregators share state, so per-channel
/// ordering is the only discipline callers must uphold (the hub's single
/// consumer loop provides it).
///
/// ## Type Parameter
///
/// - `N`: history capacity in buckets
#[derive(Debug, Clone)]
pub struct MinuteAggregator<const N: usize> {
    history: BucketRing<N>,
    open: Option<OpenBucket>,
    seeded: bool,
}

impl<const N: usize> MinuteAggregator<N> {
    /// Const initializer usable in array-repeat position
    pub const INIT: Self = Self::new();

    /// Creates an empty aggregator
    pub const fn new() -> Self {
        Self {
            history: BucketRing::new(),
            open: None,
            seeded: false,
        }
    }

    /// Ingest one reading
    ///
    /// See the module docs for the bucketing rules. Never panics and never
    /// corrupts the open bucket on bad input.
    pub fn ingest(&mut self, value: f32, timestamp: Timestamp) -> IngestOutcome {
        if !value.is_finite() {
            return IngestOutcome::DroppedNonFinite;
        }

        let key = minute_floor(timestamp);

        let open_minute = match self.open {
            Some(open) => open.minute_start,
            None => {
                // First live reading. If history was seeded from storage,
                // a minute at or behind the newest seeded bucket would
                // break the strict ordering of the ring.
                if let Some(last) = self.history.last() {
                    if key <= last.minute_start {
                        return IngestOutcome::DroppedStale { open_minute: last.minute_start };
                    }
                }
                self.open = Some(OpenBucket::seeded(key, value, timestamp));
                return IngestOutcome::Accepted { closed: None };
            }
        };

        if key == open_minute {
            if let Some(open) = self.open.as_mut() {
                open.accumulate(value, timestamp);
            }
            IngestOutcome::Accepted { closed: None }
        } else if key > open_minute {
            // Boundary crossed: finalize, append, evict if needed, reopen
            let closed = self.open.take().map(|o| o.finalize());
            if let Some(bucket) = closed {
                self.history.push(bucket);
            }
            self.open = Some(OpenBucket::seeded(key, value, timestamp));
            IngestOutcome::Accepted { closed }
        } else {
            IngestOutcome::DroppedStale { open_minute }
        }
    }

    /// Read-only view of the finalized history, oldest to newest
    pub fn history(&self) -> &BucketRing<N> {
        &self.history
    }

    /// The in-progress minute, if any reading has arrived for it
    pub fn live_point(&self) -> Option<LivePoint> {
        self.open.map(|o| o.live_point())
    }

    /// Running average of the open bucket
    ///
    /// With a single accumulated sample this is exactly the most recent
    /// raw value, so the live value always reflects the latest known
    /// reading even before any bucket has been finalized.
    pub fn live_value(&self) -> Option<f32> {
        self.live_point().map(|p| p.value)
    }

    /// One-time initialization from persisted history
    ///
    /// Buckets are appended verbatim, oldest first, subject to the same
    /// capacity trimming as live buckets. Must run before the first
    /// `ingest`; seeding a live or already-seeded aggregator is rejected.
    pub fn seed(&mut self, buckets: &[MinuteBucket]) -> TelemetryResult<()> {
        if self.seeded {
            return Err(TelemetryError::AlreadySeeded);
        }
        if self.open.is_some() || !self.history.is_empty() {
            return Err(TelemetryError::SeedAfterIngest);
        }

        for (index, pair) in buckets.windows(2).enumerate() {
            if pair[1].minute_start <= pair[0].minute_start {
                return Err(TelemetryError::SeedUnordered { index: index + 1 });
            }
        }

        for bucket in buckets {
            self.history.push(*bucket);
        }
        self.seeded = true;
        Ok(())
    }
}

impl<const N: usize> Default for MinuteAggregator<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    fn bucket(minute: u64, avg: f32) -> MinuteBucket {
        MinuteBucket {
            minute_start: minute * MIN,
            avg,
            min: avg,
            max: avg,
            sample_count: 1,
        }
    }

    #[test]
    fn single_minute_statistics() {
        let mut agg = MinuteAggregator::<59>::new();

        for (i, v) in [10.0f32, 12.0, 14.0].iter().enumerate() {
            let outcome = agg.ingest(*v, 5 * MIN + i as u64 * 1000);
            assert_eq!(outcome, IngestOutcome::Accepted { closed: None });
        }

        // Nothing finalized yet; live value is the running mean
        assert!(agg.history().is_empty());
        assert_eq!(agg.live_value(), Some(12.0));

        // A reading in the next minute closes the bucket
        let outcome = agg.ingest(20.0, 6 * MIN);
        let closed = match outcome {
            IngestOutcome::Accepted { closed: Some(b) } => b,
            other => panic!("expected closed bucket, got {:?}", other),
        };

        assert_eq!(closed.minute_start, 5 * MIN);
        assert_eq!(closed.avg, 12.0);
        assert_eq!(closed.min, 10.0);
        assert_eq!(closed.max, 14.0);
        assert_eq!(closed.sample_count, 3);
        assert_eq!(agg.history().len(), 1);
    }

    #[test]
    fn one_bucket_per_crossed_minute() {
        let mut agg = MinuteAggregator::<59>::new();

        // One reading per minute for minutes 0..k, then one in minute k
        let k = 7u64;
        for minute in 0..=k {
            agg.ingest(70.0 + minute as f32, minute * MIN + 500);
        }

        // Exactly k finalized buckets; minute k still open
        assert_eq!(agg.history().len(), k as usize);
        assert_eq!(agg.live_point().unwrap().minute_start, k * MIN);
    }

    #[test]
    fn live_value_before_first_bucket() {
        let mut agg = MinuteAggregator::<59>::new();
        assert_eq!(agg.live_value(), None);

        agg.ingest(68.4, 3 * MIN + 100);
        assert_eq!(agg.live_value(), Some(68.4));
    }

    #[test]
    fn non_finite_dropped_without_effect() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.ingest(50.0, 10 * MIN);

        assert_eq!(agg.ingest(f32::NAN, 10 * MIN + 1000), IngestOutcome::DroppedNonFinite);
        assert_eq!(
            agg.ingest(f32::INFINITY, 10 * MIN + 2000),
            IngestOutcome::DroppedNonFinite
        );

        let live = agg.live_point().unwrap();
        assert_eq!(live.sample_count, 1);
        assert_eq!(live.value, 50.0);
    }

    #[test]
    fn out_of_order_minute_dropped() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.ingest(50.0, 10 * MIN);
        agg.ingest(51.0, 11 * MIN); // closes minute 10

        // A late sample for minute 10 must not reopen the closed bucket
        let outcome = agg.ingest(99.0, 10 * MIN + 30_000);
        assert_eq!(outcome, IngestOutcome::DroppedStale { open_minute: 11 * MIN });

        assert_eq!(agg.history().len(), 1);
        assert_eq!(agg.history().last().unwrap().avg, 50.0);
        assert_eq!(agg.live_value(), Some(51.0));
    }

    #[test]
    fn gap_minutes_produce_no_buckets() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.ingest(50.0, 10 * MIN);
        // Minutes 11..14 silent, next reading in minute 15
        agg.ingest(47.0, 15 * MIN);

        // Only minute 10 finalized; the gap is a gap, not interpolated
        assert_eq!(agg.history().len(), 1);
        assert_eq!(agg.history().last().unwrap().minute_start, 10 * MIN);
        assert!(agg.history().find_minute(12 * MIN).is_none());
    }

    #[test]
    fn history_stays_bounded() {
        let mut agg = MinuteAggregator::<5>::new();

        for minute in 0..50u64 {
            agg.ingest(60.0, minute * MIN);
            assert!(agg.history().len() <= 5);
        }

        // Newest five closed minutes survive (49 is still open)
        assert_eq!(agg.history().get(0).unwrap().minute_start, 44 * MIN);
        assert_eq!(agg.history().last().unwrap().minute_start, 48 * MIN);
    }

    #[test]
    fn seed_then_read_back() {
        let mut agg = MinuteAggregator::<59>::new();
        let seed = [bucket(1, 61.0), bucket(2, 62.0), bucket(4, 64.0)];

        agg.seed(&seed).unwrap();

        let avgs: heapless::Vec<f32, 8> = agg.history().iter().map(|b| b.avg).collect();
        assert_eq!(avgs.as_slice(), &[61.0, 62.0, 64.0]);
    }

    #[test]
    fn seed_trims_to_capacity() {
        let mut agg = MinuteAggregator::<3>::new();
        let seed = [
            bucket(1, 1.0),
            bucket(2, 2.0),
            bucket(3, 3.0),
            bucket(4, 4.0),
            bucket(5, 5.0),
        ];

        agg.seed(&seed).unwrap();

        assert_eq!(agg.history().len(), 3);
        assert_eq!(agg.history().get(0).unwrap().avg, 3.0);
    }

    #[test]
    fn seed_rejected_after_ingest() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.ingest(70.0, 5 * MIN);

        assert_eq!(agg.seed(&[bucket(1, 61.0)]), Err(TelemetryError::SeedAfterIngest));
    }

    #[test]
    fn reseed_rejected() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.seed(&[bucket(1, 61.0)]).unwrap();

        assert_eq!(agg.seed(&[bucket(1, 61.0)]), Err(TelemetryError::AlreadySeeded));
    }

    #[test]
    fn unordered_seed_rejected() {
        let mut agg = MinuteAggregator::<59>::new();
        let seed = [bucket(3, 1.0), bucket(2, 2.0)];

        assert_eq!(agg.seed(&seed), Err(TelemetryError::SeedUnordered { index: 1 }));
        assert!(agg.history().is_empty());
    }

    #[test]
    fn live_reading_behind_seeded_history_dropped() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.seed(&[bucket(8, 61.0), bucket(9, 62.0)]).unwrap();

        // A first live reading inside the seeded range cannot open a
        // bucket behind the newest persisted minute
        let outcome = agg.ingest(63.0, 9 * MIN + 30_000);
        assert_eq!(outcome, IngestOutcome::DroppedStale { open_minute: 9 * MIN });

        assert!(matches!(agg.ingest(63.0, 10 * MIN), IngestOutcome::Accepted { .. }));
    }

    #[test]
    fn ingest_continues_after_seed() {
        let mut agg = MinuteAggregator::<59>::new();
        agg.seed(&[bucket(1, 61.0), bucket(2, 62.0)]).unwrap();

        agg.ingest(63.0, 3 * MIN);
        agg.ingest(64.0, 4 * MIN);

        assert_eq!(agg.history().len(), 3);
        assert_eq!(agg.history().last().unwrap().avg, 63.0);
        assert_eq!(agg.live_value(), Some(64.0));
    }
}
