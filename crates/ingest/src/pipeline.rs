//! End-to-end processing of one uplink message.
//!
//! envelope -> payload -> device lookup -> water level -> classify ->
//! persist -> notify. Every step is fail-soft: a message that cannot be
//! processed is logged and dropped, and the listener moves on.

use std::fmt;

use aquaalert_core::alert::AlertLevel;
use aquaalert_core::decoder::decode_payload;
use aquaalert_core::level::compute_water_level;
use aquaalert_core::thresholds::classify;
use aquaalert_db::models::reading::CreateReading;
use aquaalert_mqtt::{InboundMessage, MessageHandler};
use aquaalert_notify::AlertNotifier;
use chrono::Utc;
use uuid::Uuid;

use crate::envelope::{decode_data, UplinkEnvelope};
use crate::store::UplinkStore;

/// Why a message was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Body is not a JSON uplink envelope.
    InvalidEnvelope,
    /// No `deviceInfo.devEui` and no `devEUI`.
    NoDeviceIdentity,
    /// `data` missing or empty.
    EmptyPayload,
    /// `data` is not base64 or the frame could not be decoded.
    DecodeFailed,
    /// The EUI is not registered.
    UnknownDevice,
    /// Device lookup failed.
    StoreUnavailable,
    /// Stored bridge height cannot produce a water level.
    InvalidCalibration,
    /// The reading transaction failed and was rolled back.
    PersistFailed,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidEnvelope => "invalid_envelope",
            Self::NoDeviceIdentity => "no_device_identity",
            Self::EmptyPayload => "empty_payload",
            Self::DecodeFailed => "decode_failed",
            Self::UnknownDevice => "unknown_device",
            Self::StoreUnavailable => "store_unavailable",
            Self::InvalidCalibration => "invalid_calibration",
            Self::PersistFailed => "persist_failed",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Stored {
        reading_id: Uuid,
        level: AlertLevel,
        /// Whether an alert message went out.
        notified: bool,
    },
    Dropped(DropReason),
}

impl ProcessOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Processes uplinks against a store and a notifier.
pub struct IngestionPipeline<S, N> {
    store: S,
    notifier: N,
}

impl<S: UplinkStore, N: AlertNotifier> IngestionPipeline<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Process one raw message body received on `topic`.
    pub async fn process(&self, topic: &str, body: &[u8]) -> ProcessOutcome {
        let envelope = match UplinkEnvelope::parse(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(topic, error = %e, "Invalid envelope, dropping message");
                return ProcessOutcome::Dropped(DropReason::InvalidEnvelope);
            }
        };

        let Some(device_eui) = envelope.device_eui() else {
            tracing::warn!(topic, "Uplink without device EUI, dropping message");
            return ProcessOutcome::Dropped(DropReason::NoDeviceIdentity);
        };

        let Some(data) = envelope.data() else {
            tracing::warn!(device_eui = %device_eui, "Uplink without payload, dropping message");
            return ProcessOutcome::Dropped(DropReason::EmptyPayload);
        };

        let raw = match decode_data(data) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(device_eui = %device_eui, error = %e, "Payload is not base64");
                return ProcessOutcome::Dropped(DropReason::DecodeFailed);
            }
        };

        let decoded = match decode_payload(&raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(device_eui = %device_eui, error = %e, "Could not decode payload");
                return ProcessOutcome::Dropped(DropReason::DecodeFailed);
            }
        };

        let signal = envelope.signal();

        let device = match self.store.get_device(&device_eui).await {
            Ok(Some(device)) => device,
            Ok(None) => {
                tracing::warn!(
                    device_eui = %device_eui,
                    "Unknown device, register it via the device administration API",
                );
                return ProcessOutcome::Dropped(DropReason::UnknownDevice);
            }
            Err(e) => {
                tracing::error!(device_eui = %device_eui, error = %e, "Device lookup failed");
                return ProcessOutcome::Dropped(DropReason::StoreUnavailable);
            }
        };

        let level = match compute_water_level(device.bridge_height_cm, decoded.distance_cm) {
            Ok(level) => level,
            Err(e) => {
                tracing::error!(device_eui = %device_eui, error = %e, "Cannot compute water level");
                return ProcessOutcome::Dropped(DropReason::InvalidCalibration);
            }
        };

        let alert_level = classify(level.fill_pct, &device.thresholds());

        let input = CreateReading {
            id: Uuid::new_v4(),
            time: Utc::now(),
            device_eui: device.device_eui.clone(),
            distance_cm: decoded.distance_cm,
            water_level_cm: level.water_level_cm,
            fill_pct: level.fill_pct,
            battery_mv: i32::from(decoded.battery_mv),
            battery_pct: i32::from(decoded.battery_pct),
            rssi: signal.rssi,
            snr: signal.snr,
            alert_level,
        };

        let reading = match self.store.insert_reading_and_touch_device(&input).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::error!(device_eui = %device_eui, error = %e, "Failed to persist reading");
                return ProcessOutcome::Dropped(DropReason::PersistFailed);
            }
        };

        tracing::info!(
            device_eui = %device_eui,
            water_level_cm = level.water_level_cm,
            fill_pct = level.fill_pct,
            battery_pct = decoded.battery_pct,
            level = %alert_level,
            "Reading saved",
        );

        let notified = if alert_level.is_alerting() {
            self.notifier.notify(&device, &reading).await
        } else {
            false
        };

        ProcessOutcome::Stored {
            reading_id: reading.id,
            level: alert_level,
            notified,
        }
    }
}

impl<S: UplinkStore, N: AlertNotifier> MessageHandler for IngestionPipeline<S, N> {
    async fn handle(&self, message: InboundMessage) {
        let outcome = self.process(&message.topic, &message.payload).await;
        tracing::trace!(topic = %message.topic, ?outcome, "Uplink processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_reason_names() {
        assert_eq!(DropReason::UnknownDevice.to_string(), "unknown_device");
        assert_eq!(DropReason::PersistFailed.as_str(), "persist_failed");
    }

    #[test]
    fn stored_outcome() {
        let stored = ProcessOutcome::Stored {
            reading_id: Uuid::nil(),
            level: AlertLevel::Normal,
            notified: false,
        };
        assert!(stored.is_stored());
        assert!(!ProcessOutcome::Dropped(DropReason::EmptyPayload).is_stored());
    }
}
