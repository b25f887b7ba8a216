//! MQTT subscription management for sensor uplinks.
//!
//! Provides the broker connector, a transport abstraction the listener
//! runs against, fixed-delay reconnection, and the supervised
//! [`ConnectionManager`](manager::ConnectionManager) that forwards every
//! inbound publish to a [`MessageHandler`](transport::MessageHandler).

pub mod client;
pub mod config;
pub mod manager;
pub mod processor;
pub mod reconnect;
pub mod transport;

pub use client::MqttConnector;
pub use config::MqttConfig;
pub use manager::{ConnectionManager, ListenerState, StopOutcome};
pub use reconnect::ReconnectConfig;
pub use transport::{BusConnector, InboundMessage, MessageHandler, Subscription, TransportError};

/// Topic filter matching uplinks from any application and any device.
pub const UPLINK_TOPIC: &str = "application/+/device/+/event/up";
