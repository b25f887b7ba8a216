//! Device identity helpers and registration defaults.

use crate::thresholds::Thresholds;

/// Length of a LoRaWAN device EUI in hex characters.
pub const DEVICE_EUI_LEN: usize = 16;

/// Default sensor-to-riverbed distance for newly registered devices.
pub const DEFAULT_BRIDGE_HEIGHT_CM: f64 = 300.0;

/// Canonical form of a device EUI: trimmed and uppercase.
pub fn normalize_eui(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Values applied to a new device when the registration omits them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceDefaults {
    pub bridge_height_cm: f64,
    pub thresholds: Thresholds,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            bridge_height_cm: DEFAULT_BRIDGE_HEIGHT_CM,
            thresholds: Thresholds::default(),
        }
    }
}
