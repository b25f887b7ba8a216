use std::sync::Arc;

use aquaalert_core::device::DeviceDefaults;
use aquaalert_mqtt::ConnectionManager;

/// Shared state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: aquaalert_db::DbPool,
    /// Calibration applied to registrations that omit it.
    pub device_defaults: DeviceDefaults,
    /// Uplink listener, reported by `/health`.
    pub listener: Arc<ConnectionManager>,
}
