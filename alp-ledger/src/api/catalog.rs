//! Catalog onboarding endpoints (admin)

use alp_common::catalog::{AthleteProfile, ItemListing};
use alp_common::models::{Athlete, LicensingItem};
use alp_common::Caller;
use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::error::ApiResult;
use crate::AppState;

/// PUT /api/catalog/athletes/:id
pub async fn upsert_athlete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(athlete_id): Path<String>,
    Json(profile): Json<AthleteProfile>,
) -> ApiResult<Json<Athlete>> {
    let athlete = state
        .engine
        .catalog
        .upsert_athlete(&athlete_id, &profile, &caller)
        .await?;
    Ok(Json(athlete))
}

/// PUT /api/catalog/items/:id
pub async fn upsert_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(item_id): Path<String>,
    Json(listing): Json<ItemListing>,
) -> ApiResult<Json<LicensingItem>> {
    let item = state
        .engine
        .catalog
        .upsert_item(&item_id, &listing, &caller)
        .await?;
    Ok(Json(item))
}
