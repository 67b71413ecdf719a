//! alp-ledger library - licensing ledger HTTP service
//!
//! Exposes the revenue-split engine over REST. Caller identity arrives from
//! the upstream gateway as headers and is attached to every request by
//! [`api::identity_middleware`].

use alp_common::LicensingEngine;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: LicensingEngine,
}

impl AppState {
    pub fn new(engine: LicensingEngine) -> Self {
        Self { engine }
    }
}

/// Build application router
///
/// `/health` carries no identity; everything under `/api` does.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let api = Router::new()
        .route("/api/fees", get(api::get_fees).put(api::replace_fees))
        .route("/api/fees/history", get(api::fee_history))
        .route(
            "/api/athletes/:id/fee-override",
            put(api::set_fee_override).delete(api::clear_fee_override),
        )
        .route("/api/catalog/athletes/:id", put(api::upsert_athlete))
        .route("/api/catalog/items/:id", put(api::upsert_item))
        .route("/api/simulations", post(api::simulate))
        .route(
            "/api/transactions",
            post(api::commit_transaction).get(api::list_transactions),
        )
        .route("/api/transactions/:id", get(api::get_transaction))
        .route(
            "/api/transactions/:id/status",
            axum::routing::patch(api::update_transaction_status),
        )
        .route("/api/statements/athletes/:id", get(api::athlete_statement))
        .route("/api/statements/global", get(api::global_statement))
        .layer(middleware::from_fn(api::identity_middleware));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
