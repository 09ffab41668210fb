//! Wire Payload Codec
//!
//! Sensor nodes publish either a JSON object or a bare numeric value:
//!
//! ```text
//! {"value": 148.5, "unit": "°F", "ts": 1700000000.25, "sensor": "ds18b20-3"}
//! 148.5
//! ```
//!
//! Both decode to the same [`SensorPayload`]. Timestamps on the wire are
//! Unix *seconds* (fractional allowed); the engine uses milliseconds, and
//! a payload without a timestamp is stamped with the receiver's clock.
//! Device publishes carry a state string and an optional measured power:
//!
//! ```text
//! {"state": "on", "power_w": 1378.0, "ts": 1700000000.25}
//! ```

use hydroloop_core::{Channel, Device, Event, MinuteBucket, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root of the topic hierarchy
pub const TOPIC_ROOT: &str = "hydroloop";

/// Prefix of device-state topics
const DEVICE_PREFIX: &str = "device/";

/// Prefix of outbound history topics
const HISTORY_PREFIX: &str = "history/";

/// Codec errors
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Topic does not map to a registered channel or device
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// Payload is neither a valid JSON object nor a bare number
    #[error("malformed payload")]
    Malformed,

    /// Device payload carried an unrecognized state string
    #[error("unknown device state: {0}")]
    UnknownState(String),

    /// Outbound encoding failed
    #[error("encode error: {0}")]
    Encode(String),
}

/// A decoded sensor publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    /// Measured value
    pub value: f64,
    /// Unit reported by the sensor, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Unix timestamp in seconds (fractional allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    /// Reporting sensor identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
}

/// A decoded device-state publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePayload {
    /// "on" or "off"
    pub state: String,
    /// Measured power draw in watts, when the plug meter reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    /// Unix timestamp in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
}

/// Decode a sensor payload: JSON object first, bare number as fallback
pub fn parse_sensor_payload(raw: &[u8]) -> Result<SensorPayload, PayloadError> {
    if let Ok(payload) = serde_json::from_slice::<SensorPayload>(raw) {
        return Ok(payload);
    }

    core::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|value| SensorPayload { value, unit: None, ts: None, sensor: None })
        .ok_or(PayloadError::Malformed)
}

/// Reading topic for a channel, e.g. `hydroloop/heating.tank`
pub fn topic_for(channel: Channel) -> String {
    format!("{}/{}", TOPIC_ROOT, channel.id())
}

/// Device-state topic, e.g. `hydroloop/device/pump`
pub fn device_topic_for(device: Device) -> String {
    format!("{}/{}{}", TOPIC_ROOT, DEVICE_PREFIX, device.name())
}

/// Outbound bucket-update topic, e.g. `hydroloop/history/heating.tank`
pub fn update_topic_for(channel: Channel) -> String {
    format!("{}/{}{}", TOPIC_ROOT, HISTORY_PREFIX, channel.id())
}

/// Map a reading topic back to its channel
pub fn channel_for_topic(topic: &str) -> Option<Channel> {
    topic
        .strip_prefix(TOPIC_ROOT)?
        .strip_prefix('/')
        .and_then(Channel::from_id)
}

/// Map a device topic back to its device
pub fn device_for_topic(topic: &str) -> Option<Device> {
    topic
        .strip_prefix(TOPIC_ROOT)?
        .strip_prefix('/')?
        .strip_prefix(DEVICE_PREFIX)
        .and_then(Device::from_name)
}

/// Wire seconds to engine milliseconds, falling back to the receiver clock
fn wire_ts(ts: Option<f64>, fallback_now: Timestamp) -> Timestamp {
    match ts {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => (seconds * 1000.0) as Timestamp,
        _ => fallback_now,
    }
}

/// Decode one inbound publish into an engine event
///
/// `fallback_now` stamps payloads that carry no timestamp of their own.
pub fn decode_publish(
    topic: &str,
    raw: &[u8],
    fallback_now: Timestamp,
) -> Result<Event, PayloadError> {
    if let Some(device) = device_for_topic(topic) {
        let payload: DevicePayload =
            serde_json::from_slice(raw).map_err(|_| PayloadError::Malformed)?;

        let is_on = match payload.state.to_ascii_lowercase().as_str() {
            "on" => true,
            "off" => false,
            other => return Err(PayloadError::UnknownState(other.to_string())),
        };

        return Ok(Event::DeviceReport {
            device,
            is_on,
            power_w: payload.power_w.map(|p| p as f32),
            timestamp: wire_ts(payload.ts, fallback_now),
        });
    }

    if let Some(channel) = channel_for_topic(topic) {
        let payload = parse_sensor_payload(raw)?;

        return Ok(Event::Reading {
            channel,
            value: payload.value as f32,
            timestamp: wire_ts(payload.ts, fallback_now),
        });
    }

    Err(PayloadError::UnknownTopic(topic.to_string()))
}

/// Encode a finalized bucket for the outbound history topic
pub fn encode_bucket(bucket: &MinuteBucket) -> Result<String, PayloadError> {
    serde_json::to_string(bucket).map_err(|e| PayloadError::Encode(e.to_string()))
}
