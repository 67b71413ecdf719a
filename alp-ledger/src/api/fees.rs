//! Fee configuration endpoints

use alp_common::models::{AthleteFeeOverride, FeeConfiguration};
use alp_common::Caller;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ApiResult;
use crate::AppState;

/// Default and maximum number of history records returned
const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct ReplaceFeesRequest {
    pub repasse: Decimal,
    pub comissao: Decimal,
    #[serde(default)]
    pub legal_note: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FeeOverrideRequest {
    pub differentiated_commission: Decimal,
}

/// GET /api/fees
pub async fn get_fees(State(state): State<AppState>) -> ApiResult<Json<FeeConfiguration>> {
    Ok(Json(state.engine.fees.get().await?))
}

/// PUT /api/fees - replace both fractions atomically (admin)
pub async fn replace_fees(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<ReplaceFeesRequest>,
) -> ApiResult<Json<FeeConfiguration>> {
    let updated = state
        .engine
        .fees
        .replace(body.repasse, body.comissao, &body.legal_note, &caller)
        .await?;
    Ok(Json(updated))
}

/// GET /api/fees/history (admin)
pub async fn fee_history(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<FeeConfiguration>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.engine.fees.history(&caller, limit).await?))
}

/// PUT /api/athletes/:id/fee-override (admin)
pub async fn set_fee_override(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(athlete_id): Path<String>,
    Json(body): Json<FeeOverrideRequest>,
) -> ApiResult<Json<AthleteFeeOverride>> {
    let stored = state
        .engine
        .fees
        .set_athlete_override(&athlete_id, body.differentiated_commission, &caller)
        .await?;
    Ok(Json(stored))
}

/// DELETE /api/athletes/:id/fee-override (admin)
pub async fn clear_fee_override(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(athlete_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .engine
        .fees
        .clear_athlete_override(&athlete_id, &caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
