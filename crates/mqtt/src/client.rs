//! MQTT connector backed by `rumqttc`.
//!
//! [`MqttConnector`] holds the broker configuration and is constructed
//! once at startup. Each call to [`BusConnector::connect`] builds a fresh
//! client and event loop, waits for the broker's CONNACK, subscribes to
//! [`UPLINK_TOPIC`](crate::UPLINK_TOPIC), and waits for the SUBACK.

use std::collections::VecDeque;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeReasonCode};

use crate::config::MqttConfig;
use crate::transport::{BusConnector, InboundMessage, Subscription, TransportError};
use crate::UPLINK_TOPIC;

/// Capacity of the request channel between client handle and event loop.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Builds subscribed MQTT sessions from a fixed configuration.
pub struct MqttConnector {
    config: MqttConfig,
}

/// A live MQTT session subscribed to the uplink topic.
///
/// The client handle is kept alongside the event loop; dropping it would
/// close the request channel and end the session.
pub struct MqttSubscription {
    _client: AsyncClient,
    eventloop: EventLoop,
    /// Publishes that arrived before the SUBACK.
    pending: VecDeque<InboundMessage>,
}

impl MqttConnector {
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    fn options(&self) -> MqttOptions {
        let mut options =
            MqttOptions::new(&self.config.client_id, &self.config.host, self.config.port);
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);
        if let Some(username) = &self.config.username {
            options.set_credentials(username, self.config.password.clone().unwrap_or_default());
        }
        options
    }
}

impl BusConnector for MqttConnector {
    type Subscription = MqttSubscription;

    async fn connect(&self) -> Result<MqttSubscription, TransportError> {
        let (client, mut eventloop) = AsyncClient::new(self.options(), REQUEST_CHANNEL_CAPACITY);

        // rumqttc connects lazily on the first poll.
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(_) => {}
                Err(e) => return Err(TransportError::Connection(e.to_string())),
            }
        }

        tracing::info!(
            broker = %self.config.host,
            port = self.config.port,
            client_id = %self.config.client_id,
            "Connected to MQTT broker",
        );

        client
            .subscribe(UPLINK_TOPIC, QoS::AtLeastOnce)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))?;

        let mut pending = VecDeque::new();
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    if ack
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        return Err(TransportError::Subscribe(format!(
                            "broker refused subscription to {UPLINK_TOPIC}"
                        )));
                    }
                    break;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    pending.push_back(InboundMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    });
                }
                Ok(_) => {}
                Err(e) => return Err(TransportError::Subscribe(e.to_string())),
            }
        }

        Ok(MqttSubscription {
            _client: client,
            eventloop,
            pending,
        })
    }
}

impl Subscription for MqttSubscription {
    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        if let Some(message) = self.pending.pop_front() {
            return Ok(message);
        }

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return Ok(InboundMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    });
                }
                Ok(Event::Incoming(Packet::Disconnect)) => return Err(TransportError::Closed),
                // Pings, acks and outgoing notifications.
                Ok(_) => {}
                Err(e) => return Err(TransportError::Lost(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_carry_credentials_and_keep_alive() {
        let mut config = MqttConfig::new("broker.local", 1884);
        config.username = Some("ingest".into());
        config.password = Some("secret".into());
        let connector = MqttConnector::new(config);

        let options = connector.options();
        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1884));
        assert_eq!(
            options.credentials(),
            Some(("ingest".to_string(), "secret".to_string()))
        );
        assert_eq!(options.keep_alive(), std::time::Duration::from_secs(30));
        assert!(options.clean_session());
    }

    #[test]
    fn anonymous_by_default() {
        let connector = MqttConnector::new(MqttConfig::new("localhost", 1883));
        assert!(connector.options().credentials().is_none());
    }

    #[tokio::test]
    async fn unreachable_broker_is_a_connection_error() {
        // Port 1 on loopback refuses immediately.
        let connector = MqttConnector::new(MqttConfig::new("127.0.0.1", 1));
        let result = connector.connect().await;
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
