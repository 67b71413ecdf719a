//! Simulation service
//!
//! Produces a non-persisted preview of a licensing transaction. The same
//! [`price`] function is used by settlement, so a commit always recomputes
//! exactly what a simulation with the same inputs would show.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::Catalog;
use crate::fees::FeeConfigStore;
use crate::models::{Athlete, FeeConfiguration, LicensingItem, LicensingRequest, SimulationResult};
use crate::split::{calculate, resolve_split};
use crate::{Error, Result};

/// Maximum accepted usage tag length
const MAX_USAGE_TYPE_LEN: usize = 64;

/// Reject malformed arguments before any lookup
pub fn validate_request(request: &LicensingRequest) -> Result<()> {
    if request.item_id.trim().is_empty() {
        return Err(Error::InvalidInput("item_id must not be empty".to_string()));
    }
    if request.athlete_id.trim().is_empty() {
        return Err(Error::InvalidInput("athlete_id must not be empty".to_string()));
    }
    let usage = request.usage_type.trim();
    if usage.is_empty() || usage.len() > MAX_USAGE_TYPE_LEN {
        return Err(Error::InvalidInput(format!(
            "usage_type must be 1-{} characters",
            MAX_USAGE_TYPE_LEN
        )));
    }
    if request.term_months == 0 {
        return Err(Error::InvalidInput("term_months must be positive".to_string()));
    }
    Ok(())
}

/// Price a request against resolved catalog data and the current configuration
///
/// Pure: no I/O, no clock. Identical inputs give identical results.
pub fn price(
    request: &LicensingRequest,
    item: &LicensingItem,
    athlete: &Athlete,
    config: &FeeConfiguration,
) -> Result<SimulationResult> {
    if item.athlete_id != athlete.id {
        return Err(Error::InvalidInput(format!(
            "item {} does not belong to athlete {}",
            item.id, athlete.id
        )));
    }

    let (split, split_source) = resolve_split(config, athlete.commission_override)?;
    let amounts = calculate(item.base_price, &request.usage_type, request.term_months, &split)?;

    Ok(SimulationResult {
        item_title: item.title.clone(),
        total_value: amounts.total_value,
        athlete_payout: amounts.athlete_payout,
        platform_commission: amounts.platform_commission,
        athlete_pix_key: athlete.pix_key.clone(),
        repasse_fraction: split.repasse(),
        comissao_fraction: split.comissao(),
        split_source,
    })
}

/// Read-only preview service
#[derive(Clone)]
pub struct SimulationService {
    fees: FeeConfigStore,
    catalog: Arc<dyn Catalog>,
}

impl SimulationService {
    pub fn new(fees: FeeConfigStore, catalog: Arc<dyn Catalog>) -> Self {
        Self { fees, catalog }
    }

    /// Preview the split for a licensing request; no side effects
    pub async fn simulate(&self, request: &LicensingRequest) -> Result<SimulationResult> {
        validate_request(request)?;

        let item = self.catalog.item(&request.item_id).await?;
        let athlete = self.catalog.athlete(&request.athlete_id).await?;
        let config = self.fees.get().await?;

        let result = price(request, &item, &athlete, &config)?;
        debug!(
            item_id = %request.item_id,
            athlete_id = %request.athlete_id,
            total = %result.total_value,
            payout = %result.athlete_payout,
            commission = %result.platform_commission,
            source = ?result.split_source,
            "Simulated licensing transaction"
        );
        Ok(result)
    }
}
