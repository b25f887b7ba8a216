//! Handlers for reading history and per-sensor summaries.

use aquaalert_db::models::reading::Reading;
use aquaalert_db::repositories::{DeviceRepo, ReadingRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_HOURS: i64 = 24;
const MAX_HOURS: i64 = 720;
const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// Query parameters for the history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Look-back window, `1..=720` hours.
    pub hours: Option<i64>,
    /// Maximum rows, `1..=1000`.
    pub limit: Option<i64>,
}

impl HistoryParams {
    /// Apply defaults and check the bounds.
    pub fn resolve(&self) -> Result<(i64, i64), AppError> {
        let hours = self.hours.unwrap_or(DEFAULT_HOURS);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_HOURS).contains(&hours) {
            return Err(AppError::BadRequest(format!(
                "hours must be between 1 and {MAX_HOURS}"
            )));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok((hours, limit))
    }
}

/// One row of the sensor overview.
#[derive(Debug, Serialize)]
pub struct SensorSummary {
    pub device_eui: String,
    pub name: String,
    pub location_name: Option<String>,
    pub is_active: bool,
    /// Level of the latest reading, `NORMAL` when there is none.
    pub alert_level: String,
    pub last_reading: Option<Reading>,
}

/// GET /api/v1/sensors
///
/// Active devices with their most recent reading.
pub async fn list_sensors(State(state): State<AppState>) -> AppResult<Json<Vec<SensorSummary>>> {
    let devices = DeviceRepo::list_active(&state.pool).await?;

    let mut summaries = Vec::with_capacity(devices.len());
    for device in devices {
        let last_reading = ReadingRepo::latest_for_device(&state.pool, &device.device_eui).await?;
        summaries.push(SensorSummary {
            alert_level: last_reading
                .as_ref()
                .map_or_else(|| "NORMAL".to_string(), |r| r.alert_level.clone()),
            device_eui: device.device_eui,
            name: device.name,
            location_name: device.location_name,
            is_active: device.is_active,
            last_reading,
        });
    }

    Ok(Json(summaries))
}

/// GET /api/v1/devices/{eui}/readings?hours=&limit=
///
/// Newest first. An unknown device is 404; a quiet window is an empty list.
pub async fn history(
    State(state): State<AppState>,
    Path(eui): Path<String>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<Vec<Reading>>> {
    let (hours, limit) = params.resolve()?;

    if DeviceRepo::find_by_eui(&state.pool, &eui).await?.is_none() {
        return Err(AppError::NotFound(format!("Device {eui}")));
    }

    let since = Utc::now() - Duration::hours(hours);
    let readings = ReadingRepo::list_for_device(&state.pool, &eui, since, limit).await?;
    Ok(Json(readings))
}

/// GET /api/v1/devices/{eui}/readings/latest
pub async fn latest(
    State(state): State<AppState>,
    Path(eui): Path<String>,
) -> AppResult<Json<Reading>> {
    let reading = ReadingRepo::latest_for_device(&state.pool, &eui)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Readings for device {eui}")))?;
    Ok(Json(reading))
}
