//! Network-server uplink envelope.
//!
//! Only the fields the pipeline needs are modelled; everything else in the
//! JSON is ignored. Signal fields are read loosely: a value of the wrong
//! type counts as unset instead of rejecting the uplink. Both the current `deviceInfo.devEui` layout and the
//! legacy top-level `devEUI` field are accepted.

use aquaalert_core::device::normalize_eui;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

/// One uplink event as published on `application/+/device/+/event/up`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UplinkEnvelope {
    #[serde(rename = "deviceInfo", default)]
    pub device_info: Option<DeviceInfo>,
    /// Pre-v4 network servers put the EUI at the top level.
    #[serde(rename = "devEUI", default)]
    pub legacy_dev_eui: Option<String>,
    /// Base64-encoded application payload.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(rename = "rxInfo", default)]
    pub rx_info: Option<Vec<RxInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "devEui", default)]
    pub dev_eui: Option<String>,
}

/// Per-gateway reception metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxInfo {
    #[serde(default)]
    pub rssi: Option<Value>,
    #[serde(default)]
    pub snr: Option<Value>,
}

impl RxInfo {
    /// RSSI in dBm; only whole numbers in `i32` range count.
    pub fn rssi(&self) -> Option<i32> {
        self.rssi
            .as_ref()
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }

    pub fn snr(&self) -> Option<f64> {
        self.snr.as_ref().and_then(Value::as_f64)
    }
}

/// Signal quality of the first receiving gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalQuality {
    pub rssi: Option<i32>,
    pub snr: Option<f64>,
}

impl UplinkEnvelope {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Normalized device EUI, preferring `deviceInfo.devEui`.
    ///
    /// `None` when neither field carries a non-blank value.
    pub fn device_eui(&self) -> Option<String> {
        self.device_info
            .as_ref()
            .and_then(|info| info.dev_eui.as_deref())
            .filter(|eui| !eui.trim().is_empty())
            .or_else(|| {
                self.legacy_dev_eui
                    .as_deref()
                    .filter(|eui| !eui.trim().is_empty())
            })
            .map(normalize_eui)
    }

    /// The raw `data` text, if present and non-empty.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }

    pub fn signal(&self) -> SignalQuality {
        self.rx_info
            .as_deref()
            .and_then(<[RxInfo]>::first)
            .map(|rx| SignalQuality {
                rssi: rx.rssi(),
                snr: rx.snr(),
            })
            .unwrap_or_default()
    }
}

/// Decode standard (padded) base64 payload text.
pub fn decode_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data.trim())
}
