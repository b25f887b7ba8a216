//! Handlers for the `/devices` resource.

use aquaalert_db::models::device::{CreateDevice, Device, UpdateDevice};
use aquaalert_db::repositories::DeviceRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(eui: &str) -> AppError {
    AppError::NotFound(format!("Device {eui}"))
}

/// POST /api/v1/devices
///
/// Omitted calibration takes the configured defaults. The EUI is stored
/// uppercase; a duplicate yields 409.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let input = input.with_defaults(&state.device_defaults);
    input.validate()?;

    let device = DeviceRepo::create(&state.pool, &input).await?;
    tracing::info!(device_eui = %device.device_eui, name = %device.name, "Device registered");
    Ok((StatusCode::CREATED, Json(device)))
}

/// GET /api/v1/devices
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Device>>> {
    let devices = DeviceRepo::list(&state.pool).await?;
    Ok(Json(devices))
}

/// GET /api/v1/devices/{eui}
pub async fn get_by_eui(
    State(state): State<AppState>,
    Path(eui): Path<String>,
) -> AppResult<Json<Device>> {
    let device = DeviceRepo::find_by_eui(&state.pool, &eui)
        .await?
        .ok_or_else(|| not_found(&eui))?;
    Ok(Json(device))
}

/// PATCH /api/v1/devices/{eui}
///
/// Calibration changes are validated against the stored values before
/// the update is applied.
pub async fn update(
    State(state): State<AppState>,
    Path(eui): Path<String>,
    Json(input): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    let current = DeviceRepo::find_by_eui(&state.pool, &eui)
        .await?
        .ok_or_else(|| not_found(&eui))?;
    input.validate_against(&current)?;

    let device = DeviceRepo::update(&state.pool, &eui, &input)
        .await?
        .ok_or_else(|| not_found(&eui))?;
    tracing::info!(device_eui = %device.device_eui, "Device updated");
    Ok(Json(device))
}

/// DELETE /api/v1/devices/{eui}
///
/// Soft delete: the device is marked inactive and its readings are kept.
pub async fn deactivate(
    State(state): State<AppState>,
    Path(eui): Path<String>,
) -> AppResult<StatusCode> {
    if DeviceRepo::deactivate(&state.pool, &eui).await? {
        tracing::info!(device_eui = %eui, "Device deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&eui))
    }
}
