//! Route definitions for the `/devices` and `/sensors` resources.

use axum::routing::get;
use axum::Router;

use crate::handlers::{device, reading};
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// GET    /                       -> list
/// POST   /                       -> create
/// GET    /{eui}                  -> get_by_eui
/// PATCH  /{eui}                  -> update
/// DELETE /{eui}                  -> deactivate
/// GET    /{eui}/readings         -> history
/// GET    /{eui}/readings/latest  -> latest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(device::list).post(device::create))
        .route(
            "/{eui}",
            get(device::get_by_eui)
                .patch(device::update)
                .delete(device::deactivate),
        )
        .route("/{eui}/readings", get(reading::history))
        .route("/{eui}/readings/latest", get(reading::latest))
}

/// `GET /sensors` overview.
pub fn sensor_router() -> Router<AppState> {
    Router::new().route("/sensors", get(reading::list_sensors))
}
