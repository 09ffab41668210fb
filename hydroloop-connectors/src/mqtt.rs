//! MQTT Ingest for Hydroloop
//!
//! A thin subscriber over `rumqttc`: subscribes to the hydroloop topic
//! tree, decodes each publish with the [`payload`](crate::payload) codec,
//! and hands the resulting engine events to a caller-supplied sink (which
//! will typically be `TelemetryHub::push_event`). Decode failures are
//! logged and counted, never propagated; a misbehaving sensor cannot
//! stall the loop.

use std::time::Duration;

use hydroloop_core::{Event, Timestamp};
use rumqttc::{Client, Connection, Event as BrokerEvent, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};

use crate::{payload, ConnectionStats, Connector, ConnectorError};

/// MQTT broker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host name or address
    pub broker: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keepalive_s: u64,
    /// Quality of service for subscriptions and publishes (0, 1 or 2)
    pub qos: u8,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".into(),
            port: 1883,
            client_id: "hydroloop-bridge".into(),
            keepalive_s: 60,
            qos: 1,
        }
    }
}

impl MqttConfig {
    fn qos_level(&self) -> Result<QoS, ConnectorError> {
        match self.qos {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(ConnectorError::Config(format!("invalid qos {}", other))),
        }
    }
}

/// MQTT subscriber feeding the telemetry engine
pub struct MqttIngest {
    client: Client,
    connection: Connection,
    qos: QoS,
    connected: bool,
    stats: ConnectionStats,
}

impl MqttIngest {
    /// Connect to the broker and subscribe to the hydroloop topic tree
    pub fn connect(config: &MqttConfig) -> Result<Self, ConnectorError> {
        let qos = config.qos_level()?;

        let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_s));

        let (client, connection) = Client::new(options, 64);

        client
            .subscribe(format!("{}/#", payload::TOPIC_ROOT), qos)
            .map_err(|e| ConnectorError::Protocol(e.to_string()))?;

        Ok(Self {
            client,
            connection,
            qos,
            connected: true,
            stats: ConnectionStats::default(),
        })
    }

    /// Connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Drive the connection, decoding publishes into engine events
    ///
    /// Blocks on the broker event loop; `clock` stamps payloads without a
    /// wire timestamp. Returns when the connection fails.
    pub fn run<F, C>(&mut self, clock: C, mut sink: F) -> Result<(), ConnectorError>
    where
        F: FnMut(Event),
        C: Fn() -> Timestamp,
    {
        for notification in self.connection.iter() {
            match notification {
                Ok(BrokerEvent::Incoming(Packet::Publish(publish))) => {
                    self.stats.messages_received += 1;
                    match payload::decode_publish(&publish.topic, &publish.payload, clock()) {
                        Ok(event) => sink(event),
                        Err(err) => {
                            self.stats.messages_dropped += 1;
                            log::warn!("dropping publish on {}: {}", publish.topic, err);
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    self.connected = false;
                    return Err(ConnectorError::Protocol(err.to_string()));
                }
            }
        }

        Ok(())
    }
}

impl Connector for MqttIngest {
    type Error = ConnectorError;

    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        match self.client.publish(topic, self.qos, false, data.to_vec()) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                Err(ConnectorError::Protocol(e.to_string()))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MqttConfig::default();
        assert_eq!(config.broker, "localhost");
        assert_eq!(config.port, 1883);
        assert_eq!(config.qos, 1);
        assert!(config.qos_level().is_ok());
    }

    #[test]
    fn invalid_qos_rejected() {
        let config = MqttConfig { qos: 3, ..MqttConfig::default() };
        assert!(matches!(config.qos_level(), Err(ConnectorError::Config(_))));
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: MqttConfig = serde_json::from_str(
            r#"{"broker": "10.0.0.5", "port": 1883, "client_id": "shed", "keepalive_s": 30, "qos": 0}"#,
        )
        .unwrap();

        assert_eq!(config.broker, "10.0.0.5");
        assert_eq!(config.client_id, "shed");
        assert_eq!(config.qos_level().unwrap(), QoS::AtMostOnce);
    }
}
