//! River-level uplink ingestion service.
//!
//! Wires the MQTT listener to the [`pipeline::IngestionPipeline`] and
//! serves the health check plus a small device administration API.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;

use crate::state::AppState;

/// Full HTTP application: `/health` at the root and the API under `/api/v1`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state)
}
