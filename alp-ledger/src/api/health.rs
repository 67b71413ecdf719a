//! Liveness probe

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

const HEALTH: HealthResponse = HealthResponse {
    status: "ok",
    module: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

/// GET /health, answered without caller identity
pub async fn health_check() -> Json<HealthResponse> {
    Json(HEALTH)
}

/// Routes mounted outside the identity middleware
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
