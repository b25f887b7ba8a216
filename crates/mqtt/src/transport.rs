//! Transport abstraction the uplink listener runs against.
//!
//! [`BusConnector`] opens a subscribed session and [`Subscription`] yields
//! inbound messages from it. The production implementation is
//! [`MqttConnector`](crate::client::MqttConnector); tests script their own.

use std::future::Future;

/// A raw publish received from the bus, forwarded without modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Errors that end the current broker session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not reach or authenticate with the broker.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The broker rejected or failed the subscription.
    #[error("Subscribe error: {0}")]
    Subscribe(String),

    /// The session dropped while receiving.
    #[error("Connection lost: {0}")]
    Lost(String),

    /// The broker closed the session cleanly.
    #[error("Connection closed by broker")]
    Closed,
}

/// Opens a connection to the bus and subscribes to the uplink topic.
pub trait BusConnector: Send + Sync + 'static {
    type Subscription: Subscription;

    /// Connect and subscribe. Resolves once the session is ready to receive.
    fn connect(&self) -> impl Future<Output = Result<Self::Subscription, TransportError>> + Send;
}

/// A live, subscribed session.
pub trait Subscription: Send {
    /// Wait for the next inbound message.
    ///
    /// Any error means the session is unusable and must be discarded.
    fn next_message(&mut self) -> impl Future<Output = Result<InboundMessage, TransportError>> + Send;
}

/// Receives every inbound message, one at a time.
///
/// Handlers must not fail: each message is processed fail-soft and the
/// listener moves on to the next one.
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(&self, message: InboundMessage) -> impl Future<Output = ()> + Send;
}
