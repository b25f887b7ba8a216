//! Receive loop for a single subscribed session.
//!
//! Pulls messages from a [`Subscription`] and hands each one to the
//! [`MessageHandler`] in arrival order. Messages are processed one at a
//! time; the next receive only starts after the handler returns.

use tokio_util::sync::CancellationToken;

use crate::transport::{MessageHandler, Subscription, TransportError};

/// Process messages until the session fails or `cancel` fires.
///
/// Returns `Ok(())` on cancellation and the transport error otherwise.
/// Cancellation during handling abandons the in-flight message.
pub async fn run_session<S, H>(
    subscription: &mut S,
    handler: &H,
    cancel: &CancellationToken,
) -> Result<(), TransportError>
where
    S: Subscription,
    H: MessageHandler,
{
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            result = subscription.next_message() => result?,
        };

        tracing::debug!(
            topic = %message.topic,
            bytes = message.payload.len(),
            "Uplink received",
        );

        let topic = message.topic.clone();
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(topic = %topic, "Shutdown while processing uplink");
                return Ok(());
            }
            _ = handler.handle(message) => {}
        }
    }
}
