//! Transport Boundary for the Hydroloop Engine
//!
//! ## Overview
//!
//! The engine core is transport-agnostic: it consumes
//! [`Event`](hydroloop_core::Event)s and exposes read accessors. This
//! crate owns the edge between the core and the outside world:
//!
//! - the **wire payload codec** ([`payload`]): tolerant decoding of sensor
//!   and device publishes (JSON object or bare number), topic↔channel
//!   mapping, and encoding of outbound bucket updates,
//! - the **MQTT ingest** ([`mqtt`], behind the `mqtt` feature): a thin
//!   subscriber that turns broker publishes into engine events.
//!
//! Delivery is at-least-once with no cross-channel ordering guarantee;
//! the core tolerates both (duplicates land in the same minute bucket,
//! late minutes are dropped at the aggregator).
//!
//! ## Topic scheme
//!
//! ```text
//! hydroloop/<channel-id>          sensor readings  (e.g. hydroloop/heating.tank)
//! hydroloop/device/<device-name>  device state     (e.g. hydroloop/device/pump)
//! hydroloop/history/<channel-id>  outbound bucket updates
//! ```
//!
//! Unknown topics and unparseable payloads are dropped with a warning;
//! nothing at this boundary can corrupt per-channel state.

pub mod payload;

#[cfg(feature = "mqtt")]
pub mod mqtt;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttIngest};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connector is not connected to its broker/peer
    #[error("not connected")]
    NotConnected,

    /// The outbound buffer rejected the message
    #[error("buffer full")]
    BufferFull,

    /// Transport-level failure
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid connector configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Trait for all protocol connectors
pub trait Connector {
    /// Connector-specific error type
    type Error;

    /// Send an encoded message to `topic`
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total publishes received
    pub messages_received: u64,
    /// Publishes dropped at the codec (unknown topic, bad payload)
    pub messages_dropped: u64,
}
