//! Event Types for the Telemetry Pipeline
//!
//! Events are the unit of work flowing through the hub: sensor readings
//! and device reports flow *in* from the transport collaborator, and
//! bucket-closed notifications flow *out* to the presentation
//! collaborator. Per-channel ordering of incoming events is assumed
//! monotonic but tolerated if violated (late readings are dropped at the
//! aggregator, never reordered).
//!
//! Events are small `Copy`-friendly values: no heap, safe to queue by the
//! hundreds on a gateway-class device.

use crate::{
    aggregate::MinuteBucket,
    channels::{Channel, Device},
    time::Timestamp,
};

/// An event in the telemetry pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// One scalar observation for a channel
    Reading {
        /// Channel the observation belongs to
        channel: Channel,
        /// Measured value in the channel's unit
        value: f32,
        /// When the observation was taken (ms since epoch)
        timestamp: Timestamp,
    },

    /// State report for a controllable device
    DeviceReport {
        /// Device being reported
        device: Device,
        /// Whether the device is switched on
        is_on: bool,
        /// Measured power draw in watts, when available
        power_w: Option<f32>,
        /// When the state was observed
        timestamp: Timestamp,
    },

    /// A minute bucket was finalized for a channel
    ///
    /// Emitted by the hub when a boundary crossing closes a bucket; the
    /// presentation collaborator drains these to push updates to clients.
    BucketClosed {
        /// Channel whose bucket closed
        channel: Channel,
        /// The finalized bucket
        bucket: MinuteBucket,
    },
}

impl Event {
    /// Get event timestamp
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Reading { timestamp, .. } => *timestamp,
            Event::DeviceReport { timestamp, .. } => *timestamp,
            Event::BucketClosed { bucket, .. } => bucket.minute_start,
        }
    }

    /// Get the channel if this event belongs to one
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Event::Reading { channel, .. } => Some(*channel),
            Event::BucketClosed { channel, .. } => Some(*channel),
            Event::DeviceReport { .. } => None,
        }
    }
}

/// Event builder for convenient construction
pub struct EventBuilder {
    timestamp: Timestamp,
}

impl EventBuilder {
    /// Create a builder stamping events with `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Build a reading event
    pub fn reading(self, channel: Channel, value: f32) -> Event {
        Event::Reading {
            channel,
            value,
            timestamp: self.timestamp,
        }
    }

    /// Build a device report event
    pub fn device(self, device: Device, is_on: bool, power_w: Option<f32>) -> Event {
        Event::DeviceReport {
            device,
            is_on,
            power_w,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_accessors() {
        let event = EventBuilder::new(1000).reading(Channel::Tank, 150.0);
        assert_eq!(event.timestamp(), 1000);
        assert_eq!(event.channel(), Some(Channel::Tank));

        let report = EventBuilder::new(2000).device(Device::Pump, true, Some(38.0));
        assert_eq!(report.timestamp(), 2000);
        assert_eq!(report.channel(), None);
    }

    #[test]
    fn event_size() {
        // Events sit in fixed-capacity queues; keep them compact
        assert!(core::mem::size_of::<Event>() <= 48);
    }
}
