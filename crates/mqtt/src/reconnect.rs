//! Fixed-delay reconnection for the uplink listener.
//!
//! After any transport failure the listener waits [`ReconnectConfig::delay`]
//! and tries again, indefinitely, until the [`CancellationToken`] fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Default pause between reconnection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Reconnection parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectConfig {
    /// Delay before every reconnection attempt. Does not grow.
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ReconnectConfig {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Sleep for the configured delay unless cancelled first.
///
/// Returns `true` when the caller should retry and `false` when the
/// token was cancelled during (or before) the wait.
pub async fn wait_before_retry(config: &ReconnectConfig, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(config.delay) => true,
    }
}
