//! Simulation endpoint: dry run, no side effects

use alp_common::models::{LicensingRequest, SimulationResult};
use axum::{extract::State, Json};

use super::error::ApiResult;
use crate::AppState;

/// POST /api/simulations
pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<LicensingRequest>,
) -> ApiResult<Json<SimulationResult>> {
    Ok(Json(state.engine.simulation.simulate(&request).await?))
}
