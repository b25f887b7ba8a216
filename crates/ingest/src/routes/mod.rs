pub mod device;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /devices    device registration, calibration and history
/// /sensors    active devices with their latest reading
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/devices", device::router())
        .merge(device::sensor_router())
}
