//! Telemetry Hub: the Consume/Dispatch Boundary
//!
//! ## Overview
//!
//! The hub is the single entry point for the engine. Transport callbacks
//! push events into a bounded input queue; `process_batch` drains that
//! queue strictly in arrival order and dispatches each event to the owning
//! channel's aggregator. Because exactly one consumer loop mutates the
//! per-channel state, the ordering invariant that bucket-boundary
//! detection depends on is enforced structurally rather than by
//! convention.
//!
//! ```text
//! Transport → EventQueue → dispatch → MinuteAggregator (per channel)
//!                                   → DeviceState slots
//!                                   → update queue → Presentation
//! ```
//!
//! Finalized buckets surface as [`Event::BucketClosed`] on the update
//! queue for the push-to-client fan-out to drain. Everything the dashboard
//! reads (history, live values, rates, thermal snapshots) comes from the
//! hub's accessor methods.
//!
//! ## Memory model
//!
//! All state is fixed-capacity: the two queues, one aggregator per
//! registered channel, and one state slot per device. An unbounded burst
//! of readings can only ever shed events at the queue according to the
//! configured [`Backpressure`] strategy; it cannot grow memory.

use heapless::Deque;

use crate::{
    aggregate::{IngestOutcome, MinuteAggregator, MinuteBucket},
    channels::{Channel, Device, DeviceState, CHANNEL_COUNT, DEVICE_COUNT},
    constants::{
        buffers::{RATE_POINTS_MAX, UPDATE_QUEUE_DEPTH},
        time::{MS_PER_MINUTE, STALE_AFTER_MS},
    },
    errors::TelemetryResult,
    events::Event,
    history::BucketRing,
    rate::{format_rate, rate_at_default, RateDisplay, RateEstimate, RatePoint},
    thermal::{ThermalConfig, ThermalInputs, ThermalModel, ThermalSnapshot},
    time::{minute_floor, Timestamp},
};

pub use crate::constants::buffers::HISTORY_CAPACITY;

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    // Evaluate the format arguments so bindings stay used
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

/// Backpressure handling strategy for the input queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Drop the oldest queued event to make room
    DropOldest,
    /// Drop the incoming event
    DropNewest,
    /// Refuse the incoming event (push returns false)
    Reject,
}

/// Hub counters for monitoring
///
/// Everything the hub sheds is counted here; nothing is dropped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubMetrics {
    /// Readings accumulated into a bucket
    pub accepted: u32,
    /// Readings dropped for a NaN/infinite value
    pub dropped_non_finite: u32,
    /// Readings dropped for arriving behind the open minute
    pub dropped_out_of_order: u32,
    /// Events shed at the input queue by backpressure
    pub dropped_queue_full: u32,
    /// Bucket notifications shed because the update queue was full
    pub dropped_updates: u32,
    /// Buckets finalized across all channels
    pub buckets_closed: u32,
    /// Device reports applied
    pub device_reports: u32,
}

/// Bounded FIFO of pipeline events
pub struct EventQueue<const N: usize> {
    inner: Deque<Event, N>,
}

impl<const N: usize> EventQueue<N> {
    /// Creates an empty queue
    pub const fn new() -> Self {
        Self { inner: Deque::new() }
    }

    /// Append an event; false when full
    pub fn push(&mut self, event: Event) -> bool {
        self.inner.push_back(event).is_ok()
    }

    /// Remove and return the oldest event
    pub fn pop(&mut self) -> Option<Event> {
        self.inner.pop_front()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Check if the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A channel's current smoothed value with freshness information
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiveReading {
    /// Running average of the in-progress minute
    pub value: f32,
    /// Minute the value belongs to
    pub minute_start: Timestamp,
    /// Milliseconds since the last sample
    pub age_ms: u64,
    /// True when the last sample is older than the staleness limit
    pub is_stale: bool,
}

/// A channel's rate of change with its rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRate {
    /// The numeric estimate, absent below warm-up
    pub estimate: Option<RateEstimate>,
    /// The formatted display per the rendering contract
    pub display: RateDisplay,
}

/// The telemetry hub
///
/// ## Type Parameter
///
/// - `QN`: input event queue depth, e.g.
///   [`DEFAULT_QUEUE_DEPTH`](crate::constants::buffers::DEFAULT_QUEUE_DEPTH)
pub struct TelemetryHub<const QN: usize> {
    input: EventQueue<QN>,
    updates: EventQueue<UPDATE_QUEUE_DEPTH>,
    aggregators: [MinuteAggregator<HISTORY_CAPACITY>; CHANNEL_COUNT],
    devices: [Option<DeviceState>; DEVICE_COUNT],
    model: ThermalModel,
    backpressure: Backpressure,
    metrics: HubMetrics,
}

impl<const QN: usize> TelemetryHub<QN> {
    /// Create a hub with default thermal coefficients
    pub fn new() -> Self {
        Self::with_config(ThermalConfig::default())
    }

    /// Create a hub with explicit thermal coefficients
    pub fn with_config(config: ThermalConfig) -> Self {
        Self {
            input: EventQueue::new(),
            updates: EventQueue::new(),
            aggregators: [MinuteAggregator::<HISTORY_CAPACITY>::INIT; CHANNEL_COUNT],
            devices: [None; DEVICE_COUNT],
            model: ThermalModel::new(config),
            backpressure: Backpressure::DropOldest,
            metrics: HubMetrics::default(),
        }
    }

    /// Set the backpressure strategy
    pub fn backpressure(mut self, strategy: Backpressure) -> Self {
        self.backpressure = strategy;
        self
    }

    /// Initialize a channel's history from persisted buckets
    ///
    /// Must run before any reading for that channel has been ingested.
    pub fn seed(&mut self, channel: Channel, buckets: &[MinuteBucket]) -> TelemetryResult<()> {
        self.aggregators[channel.index()].seed(buckets)
    }

    /// Push an event into the input queue
    ///
    /// Returns false when the event was shed (strategy `Reject` or
    /// `DropNewest` on a full queue).
    pub fn push_event(&mut self, event: Event) -> bool {
        if self.input.push(event) {
            return true;
        }

        match self.backpressure {
            Backpressure::DropOldest => {
                let _ = self.input.pop();
                self.metrics.dropped_queue_full += 1;
                self.input.push(event)
            }
            Backpressure::DropNewest | Backpressure::Reject => {
                self.metrics.dropped_queue_full += 1;
                false
            }
        }
    }

    /// Drain up to `max_events` from the input queue, in arrival order
    ///
    /// Each event is fully dispatched before the next is popped; this loop
    /// is the single writer of all per-channel state.
    pub fn process_batch(&mut self, max_events: usize) -> usize {
        let mut processed = 0;

        for _ in 0..max_events {
            let event = match self.input.pop() {
                Some(e) => e,
                None => break,
            };

            self.dispatch(event);
            processed += 1;
        }

        processed
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Reading { channel, value, timestamp } => {
                match self.aggregators[channel.index()].ingest(value, timestamp) {
                    IngestOutcome::Accepted { closed } => {
                        self.metrics.accepted += 1;
                        if let Some(bucket) = closed {
                            self.metrics.buckets_closed += 1;
                            self.push_update(Event::BucketClosed { channel, bucket });
                        }
                    }
                    IngestOutcome::DroppedNonFinite => {
                        self.metrics.dropped_non_finite += 1;
                        log_debug!("non-finite sample dropped on {}", channel.id());
                    }
                    IngestOutcome::DroppedStale { open_minute } => {
                        self.metrics.dropped_out_of_order += 1;
                        log_warn!(
                            "out-of-order sample dropped on {}: t={} behind open minute {}",
                            channel.id(),
                            timestamp,
                            open_minute
                        );
                    }
                }
            }
            Event::DeviceReport { device, is_on, power_w, timestamp } => {
                self.devices[device.index()] = Some(DeviceState { is_on, power_w, timestamp });
                self.metrics.device_reports += 1;
            }
            // Already-finalized buckets (e.g. replayed by a collaborator)
            // pass straight through to the update queue
            Event::BucketClosed { .. } => self.push_update(event),
        }
    }

    fn push_update(&mut self, event: Event) {
        if !self.updates.push(event) {
            // Keep the newest notification; the oldest is the least useful
            let _ = self.updates.pop();
            self.metrics.dropped_updates += 1;
            let _ = self.updates.push(event);
        }
    }

    /// Next outbound update for the presentation collaborator
    pub fn pop_update(&mut self) -> Option<Event> {
        self.updates.pop()
    }

    /// Hub counters
    pub fn metrics(&self) -> &HubMetrics {
        &self.metrics
    }

    /// Current input queue depth
    pub fn input_depth(&self) -> usize {
        self.input.len()
    }

    /// A channel's finalized minute history, oldest to newest
    pub fn history(&self, channel: Channel) -> &BucketRing<HISTORY_CAPACITY> {
        self.aggregators[channel.index()].history()
    }

    /// A channel's current smoothed value, with staleness relative to `now`
    pub fn live(&self, channel: Channel, now: Timestamp) -> Option<LiveReading> {
        self.aggregators[channel.index()].live_point().map(|p| {
            let age_ms = now.saturating_sub(p.last_update);
            LiveReading {
                value: p.value,
                minute_start: p.minute_start,
                age_ms,
                is_stale: age_ms > STALE_AFTER_MS,
            }
        })
    }

    /// Last reported state of a device
    pub fn device(&self, device: Device) -> Option<DeviceState> {
        self.devices[device.index()]
    }

    /// A channel's rate of change at the freshest observation
    pub fn rate(&self, channel: Channel) -> ChannelRate {
        let points = self.rate_points(channel);
        let estimate = if points.is_empty() {
            None
        } else {
            rate_at_default(&points, points.len() - 1)
        };

        ChannelRate {
            estimate,
            display: format_rate(estimate.as_ref(), channel),
        }
    }

    /// Finalized history with the live point appended as the last element
    fn rate_points(&self, channel: Channel) -> heapless::Vec<RatePoint, RATE_POINTS_MAX> {
        let aggregator = &self.aggregators[channel.index()];

        let mut points: heapless::Vec<RatePoint, RATE_POINTS_MAX> = aggregator
            .history()
            .iter()
            .map(|b| RatePoint { minute_start: b.minute_start, value: Some(b.avg) })
            .collect();

        if let Some(live) = aggregator.live_point() {
            let _ = points.push(RatePoint {
                minute_start: live.minute_start,
                value: Some(live.value),
            });
        }

        points
    }

    /// Evaluate the thermal model against the current channel and device
    /// state
    ///
    /// `now` anchors the transit-shifted loop-supply lookup: the supply
    /// bucket exactly `transit_minutes` before the current minute. A gap
    /// at that minute leaves the water-side extraction absent rather than
    /// interpolating.
    pub fn thermal_snapshot(&self, now: Timestamp) -> ThermalSnapshot {
        let live = |channel: Channel| self.aggregators[channel.index()].live_value();

        let heater = self.device(Device::Heater);
        let pump = self.device(Device::Pump);

        let transit_ms = self.model.config().transit_minutes as u64 * MS_PER_MINUTE;
        let supply_minute = minute_floor(now).saturating_sub(transit_ms);
        let loop_supply_past = self
            .history(Channel::LoopSupply)
            .find_minute(supply_minute)
            .map(|b| b.avg);

        self.model.snapshot(&ThermalInputs {
            tank: live(Channel::Tank),
            floor: live(Channel::Floor),
            room: live(Channel::Room),
            outside: live(Channel::Outside),
            heater_on: heater.map(|d| d.is_on).unwrap_or(false),
            heater_power_w: heater.and_then(|d| d.power_w),
            pump_on: pump.map(|d| d.is_on).unwrap_or(false),
            tank_rate_per_hour: self.rate(Channel::Tank).estimate.map(|e| e.per_hour),
            loop_supply_past,
            loop_return_now: live(Channel::LoopReturn),
        })
    }
}

impl<const QN: usize> Default for TelemetryHub<QN> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBuilder;

    const MIN: u64 = 60_000;

    #[test]
    fn queue_orders_fifo() {
        let mut queue: EventQueue<4> = EventQueue::new();
        assert!(queue.is_empty());

        for i in 0..3u64 {
            assert!(queue.push(EventBuilder::new(i).reading(Channel::Tank, i as f32)));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().timestamp(), 0);
        assert_eq!(queue.pop().unwrap().timestamp(), 1);
    }

    #[test]
    fn drop_oldest_backpressure() {
        let mut hub: TelemetryHub<2> = TelemetryHub::new();

        for i in 0..3u64 {
            hub.push_event(EventBuilder::new(i * MIN).reading(Channel::Tank, 70.0));
        }

        // Oldest was shed to admit the newest
        assert_eq!(hub.input_depth(), 2);
        assert_eq!(hub.metrics().dropped_queue_full, 1);
    }

    #[test]
    fn reject_backpressure() {
        let mut hub: TelemetryHub<1> = TelemetryHub::new().backpressure(Backpressure::Reject);

        assert!(hub.push_event(EventBuilder::new(0).reading(Channel::Tank, 70.0)));
        assert!(!hub.push_event(EventBuilder::new(1).reading(Channel::Tank, 71.0)));
        assert_eq!(hub.input_depth(), 1);
    }

    #[test]
    fn batch_respects_limit() {
        let mut hub: TelemetryHub<8> = TelemetryHub::new();

        for i in 0..5u64 {
            hub.push_event(EventBuilder::new(i * 1000).reading(Channel::Room, 68.0));
        }

        assert_eq!(hub.process_batch(3), 3);
        assert_eq!(hub.input_depth(), 2);
        assert_eq!(hub.process_batch(100), 2);
    }

    #[test]
    fn device_reports_update_slots() {
        let mut hub: TelemetryHub<8> = TelemetryHub::new();

        hub.push_event(EventBuilder::new(1000).device(Device::Pump, true, Some(38.0)));
        hub.process_batch(10);

        let pump = hub.device(Device::Pump).unwrap();
        assert!(pump.is_on);
        assert_eq!(pump.power_w, Some(38.0));
        assert!(hub.device(Device::Heater).is_none());
    }

    #[test]
    fn closed_buckets_surface_as_updates() {
        let mut hub: TelemetryHub<8> = TelemetryHub::new();

        hub.push_event(EventBuilder::new(MIN).reading(Channel::Tank, 150.0));
        hub.push_event(EventBuilder::new(2 * MIN).reading(Channel::Tank, 151.0));
        hub.process_batch(10);

        match hub.pop_update() {
            Some(Event::BucketClosed { channel, bucket }) => {
                assert_eq!(channel, Channel::Tank);
                assert_eq!(bucket.minute_start, MIN);
                assert_eq!(bucket.avg, 150.0);
            }
            other => panic!("expected BucketClosed, got {:?}", other),
        }
        assert!(hub.pop_update().is_none());
    }

    #[test]
    fn live_staleness() {
        let mut hub: TelemetryHub<8> = TelemetryHub::new();

        hub.push_event(EventBuilder::new(10 * MIN).reading(Channel::Room, 68.0));
        hub.process_batch(10);

        let fresh = hub.live(Channel::Room, 10 * MIN + 30_000).unwrap();
        assert!(!fresh.is_stale);
        assert_eq!(fresh.age_ms, 30_000);

        let stale = hub.live(Channel::Room, 16 * MIN).unwrap();
        assert!(stale.is_stale);
    }
}
