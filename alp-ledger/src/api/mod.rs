//! HTTP API handlers for alp-ledger

pub mod error;
pub mod fees;
pub mod health;
pub mod identity;
pub mod catalog;
pub mod simulations;
pub mod statements;
pub mod transactions;

pub use catalog::{upsert_athlete, upsert_item};
pub use error::{ApiError, ApiResult};
pub use fees::{clear_fee_override, fee_history, get_fees, replace_fees, set_fee_override};
pub use health::health_routes;
pub use identity::identity_middleware;
pub use simulations::simulate;
pub use statements::{athlete_statement, global_statement};
pub use transactions::{
    commit_transaction, get_transaction, list_transactions, update_transaction_status,
};

use alp_common::models::LedgerStatus;

/// Parse a comma-separated `status` query value
pub(crate) fn parse_status_filter(raw: Option<&str>) -> ApiResult<Option<Vec<LedgerStatus>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            LedgerStatus::parse(part)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", part.trim())))
        })
        .collect::<ApiResult<Vec<_>>>()
        .map(Some)
}
