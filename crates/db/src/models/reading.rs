//! Sensor reading entity model (append-only time series).

use aquaalert_core::alert::AlertLevel;
use aquaalert_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single uplink observation from the `sensor_readings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reading {
    pub id: Uuid,
    pub time: Timestamp,
    pub device_eui: String,
    pub distance_cm: Option<f64>,
    pub water_level_cm: Option<f64>,
    pub fill_pct: Option<f64>,
    pub battery_mv: Option<i32>,
    pub battery_pct: Option<i32>,
    pub rssi: Option<i32>,
    pub snr: Option<f64>,
    /// One of `NORMAL`, `WATCH`, `WARNING`, `CRITICAL`.
    pub alert_level: String,
}

impl Reading {
    /// Typed alert level. Unknown stored values read as `Normal`.
    pub fn level(&self) -> AlertLevel {
        AlertLevel::parse(&self.alert_level).unwrap_or(AlertLevel::Normal)
    }
}

/// DTO for inserting a new reading.
///
/// Every field is computed by the ingestion pipeline; `id` and `time` are
/// assigned per processing attempt, so replays produce distinct rows.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReading {
    pub id: Uuid,
    pub time: Timestamp,
    pub device_eui: String,
    pub distance_cm: f64,
    pub water_level_cm: f64,
    pub fill_pct: f64,
    pub battery_mv: i32,
    pub battery_pct: i32,
    pub rssi: Option<i32>,
    pub snr: Option<f64>,
    pub alert_level: AlertLevel,
}

impl CreateReading {
    /// The row this DTO produces once inserted.
    pub fn to_reading(&self) -> Reading {
        Reading {
            id: self.id,
            time: self.time,
            device_eui: self.device_eui.clone(),
            distance_cm: Some(self.distance_cm),
            water_level_cm: Some(self.water_level_cm),
            fill_pct: Some(self.fill_pct),
            battery_mv: Some(self.battery_mv),
            battery_pct: Some(self.battery_pct),
            rssi: self.rssi,
            snr: self.snr,
            alert_level: self.alert_level.as_str().to_string(),
        }
    }
}
