//! Device entity model and DTOs.

use aquaalert_core::device::{normalize_eui, DeviceDefaults};
use aquaalert_core::error::CoreError;
use aquaalert_core::threshold_validation::{
    validate_bridge_height, validate_device_eui, validate_thresholds,
};
use aquaalert_core::thresholds::Thresholds;
use aquaalert_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered sensor node from the `devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub device_eui: String,
    pub name: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Distance from the sensor to the riverbed (zero level).
    pub bridge_height_cm: f64,
    pub threshold_watch_pct: f64,
    pub threshold_warning_pct: f64,
    pub threshold_critical_pct: f64,
    pub is_active: bool,
    /// Time of the last persisted uplink. Written only by ingestion.
    pub last_seen: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Device {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            watch: self.threshold_watch_pct,
            warning: self.threshold_warning_pct,
            critical: self.threshold_critical_pct,
        }
    }
}

/// DTO for registering a new device.
///
/// Omitted calibration fields fall back to [`DeviceDefaults`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDevice {
    pub device_eui: String,
    pub name: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bridge_height_cm: Option<f64>,
    pub threshold_watch_pct: Option<f64>,
    pub threshold_warning_pct: Option<f64>,
    pub threshold_critical_pct: Option<f64>,
}

impl CreateDevice {
    /// Normalize the EUI and fill omitted calibration from `defaults`.
    pub fn with_defaults(mut self, defaults: &DeviceDefaults) -> Self {
        self.device_eui = normalize_eui(&self.device_eui);
        self.bridge_height_cm.get_or_insert(defaults.bridge_height_cm);
        self.threshold_watch_pct.get_or_insert(defaults.thresholds.watch);
        self.threshold_warning_pct.get_or_insert(defaults.thresholds.warning);
        self.threshold_critical_pct.get_or_insert(defaults.thresholds.critical);
        self
    }

    /// Validate EUI shape, calibration and threshold ordering.
    ///
    /// Call after [`with_defaults`](Self::with_defaults); unset fields are
    /// checked against the built-in defaults.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fallback = DeviceDefaults::default();
        validate_device_eui(&self.device_eui)?;
        validate_bridge_height(self.bridge_height_cm.unwrap_or(fallback.bridge_height_cm))?;
        validate_thresholds(&Thresholds {
            watch: self
                .threshold_watch_pct
                .unwrap_or(fallback.thresholds.watch),
            warning: self
                .threshold_warning_pct
                .unwrap_or(fallback.thresholds.warning),
            critical: self
                .threshold_critical_pct
                .unwrap_or(fallback.thresholds.critical),
        })
    }
}

/// DTO for updating an existing device. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDevice {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bridge_height_cm: Option<f64>,
    pub threshold_watch_pct: Option<f64>,
    pub threshold_warning_pct: Option<f64>,
    pub threshold_critical_pct: Option<f64>,
    pub is_active: Option<bool>,
}

impl UpdateDevice {
    /// Validate the calibration `current` would have after this patch.
    pub fn validate_against(&self, current: &Device) -> Result<(), CoreError> {
        validate_bridge_height(self.bridge_height_cm.unwrap_or(current.bridge_height_cm))?;
        validate_thresholds(&Thresholds {
            watch: self.threshold_watch_pct.unwrap_or(current.threshold_watch_pct),
            warning: self
                .threshold_warning_pct
                .unwrap_or(current.threshold_warning_pct),
            critical: self
                .threshold_critical_pct
                .unwrap_or(current.threshold_critical_pct),
        })
    }
}
