//! Statement (extrato) endpoints

use alp_common::{Caller, Statement};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::error::ApiResult;
use super::parse_status_filter;
use crate::AppState;

/// `status` is a comma-separated list; omitted means the configured policy
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    pub status: Option<String>,
}

/// GET /api/statements/athletes/:id
pub async fn athlete_statement(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(athlete_id): Path<String>,
    Query(query): Query<StatementQuery>,
) -> ApiResult<Json<Statement>> {
    let filter = parse_status_filter(query.status.as_deref())?;
    let statement = state
        .engine
        .statements
        .statement_for_athlete(&athlete_id, filter.as_deref(), &caller)
        .await?;
    Ok(Json(statement))
}

/// GET /api/statements/global (admin)
pub async fn global_statement(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<StatementQuery>,
) -> ApiResult<Json<Statement>> {
    let filter = parse_status_filter(query.status.as_deref())?;
    let statement = state
        .engine
        .statements
        .global_statement(filter.as_deref(), &caller)
        .await?;
    Ok(Json(statement))
}
