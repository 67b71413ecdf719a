//! Ledger transaction endpoints: commit, read, reconcile

use alp_common::models::{LedgerEntry, LedgerStatus, LicensingRequest};
use alp_common::{Caller, CommitDisposition};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::parse_status_filter;
use crate::AppState;

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 1000;

/// Commit body: the licensing request plus its idempotency key
#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    pub request_id: String,
    #[serde(flatten)]
    pub request: LicensingRequest,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub disposition: CommitDisposition,
    pub entry: LedgerEntry,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub athlete_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: LedgerStatus,
}

/// POST /api/transactions
///
/// 201 when the entry was created, 200 when `request_id` was already committed.
pub async fn commit_transaction(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CommitRequest>,
) -> ApiResult<(StatusCode, Json<CommitResponse>)> {
    let outcome = state
        .engine
        .settlement
        .commit(&body.request, &body.request_id, &caller)
        .await?;

    let status = match outcome.disposition {
        CommitDisposition::Created => StatusCode::CREATED,
        CommitDisposition::Replayed => StatusCode::OK,
    };
    Ok((
        status,
        Json(CommitResponse {
            disposition: outcome.disposition,
            entry: outcome.entry,
        }),
    ))
}

/// GET /api/transactions?athlete_id=&status=&limit=
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    let filter = parse_status_filter(query.status.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    let entries = state
        .engine
        .statements
        .list_entries(query.athlete_id.as_deref(), filter.as_deref(), limit, &caller)
        .await?;
    Ok(Json(entries))
}

/// GET /api/transactions/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<LedgerEntry>> {
    let id = parse_entry_id(&id)?;
    Ok(Json(state.engine.statements.get_entry(id, &caller).await?))
}

/// PATCH /api/transactions/:id/status (admin)
pub async fn update_transaction_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> ApiResult<Json<LedgerEntry>> {
    let id = parse_entry_id(&id)?;
    let entry = state
        .engine
        .settlement
        .update_status(id, body.status, &caller)
        .await?;
    Ok(Json(entry))
}

fn parse_entry_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid entry id: {}", raw)))
}
