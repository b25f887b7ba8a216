//! Telegram Bot API delivery.
//!
//! [`TelegramNotifier`] sends a single `sendMessage` request per alert.
//! There is no retry: a failed delivery is logged and reported as `false`.

use std::time::Duration;

use aquaalert_core::alert::AlertLevel;
use aquaalert_db::models::device::Device;
use aquaalert_db::models::reading::Reading;

use crate::config::TelegramConfig;
use crate::message::format_alert_message;
use crate::notifier::AlertNotifier;

/// HTTP request timeout for one delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Telegram delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Network, DNS, timeout or client construction failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Bot API answered with a non-2xx status.
    #[error("Telegram returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// TelegramNotifier
// ---------------------------------------------------------------------------

/// Posts alert messages to a Telegram chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Send an alert for `reading`. Returns whether the message was sent.
    ///
    /// NORMAL readings and an unconfigured bot skip delivery. Every failure
    /// is logged here and never propagated.
    pub async fn send_alert(&self, device: &Device, reading: &Reading) -> bool {
        let level = reading.level();
        if level == AlertLevel::Normal {
            return false;
        }

        if !self.config.is_configured() {
            tracing::warn!(
                device_eui = %device.device_eui,
                level = %level,
                "Telegram not configured, skipping alert",
            );
            return false;
        }

        let text = format_alert_message(device, reading);
        match self.try_send(&text).await {
            Ok(()) => {
                tracing::info!(device_eui = %device.device_eui, level = %level, "Telegram alert sent");
                true
            }
            Err(e) => {
                tracing::error!(
                    device_eui = %device.device_eui,
                    level = %level,
                    error = %e,
                    "Telegram alert failed",
                );
                false
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, text: &str) -> Result<(), TelegramError> {
        let payload = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TelegramError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl AlertNotifier for TelegramNotifier {
    async fn notify(&self, device: &Device, reading: &Reading) -> bool {
        self.send_alert(device, reading).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_fail() {
        assert!(TelegramNotifier::new(TelegramConfig::default()).is_ok());
    }

    #[test]
    fn http_status_error_display() {
        assert_eq!(
            TelegramError::HttpStatus(401).to_string(),
            "Telegram returned HTTP 401"
        );
    }
}
