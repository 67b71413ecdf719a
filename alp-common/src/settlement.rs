//! Settlement/commit service
//!
//! Turns a licensing request into exactly one immutable ledger entry.
//! Amounts are always recomputed server-side with the same pricing used by
//! simulation; nothing from a prior preview is trusted. The caller-supplied
//! `request_id` is the idempotency key: retries and concurrent duplicates
//! observe the entry created by the first successful call.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{require_admin, require_admin_or_athlete, Caller};
use crate::catalog::Catalog;
use crate::fees::FeeConfigStore;
use crate::ledger::{AppendOutcome, LedgerStore};
use crate::models::{LedgerEntry, LedgerStatus, LicensingRequest};
use crate::simulation::{price, validate_request};
use crate::time;
use crate::{Error, Result};

/// Maximum accepted idempotency key length
const MAX_REQUEST_ID_LEN: usize = 128;

/// Whether a commit wrote a new entry or replayed an earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitDisposition {
    Created,
    /// Same request id seen before; the earlier entry is returned
    Replayed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    pub entry: LedgerEntry,
    pub disposition: CommitDisposition,
}

/// Side-effecting half of the licensing flow
#[derive(Clone)]
pub struct SettlementService {
    fees: FeeConfigStore,
    catalog: Arc<dyn Catalog>,
    ledger: LedgerStore,
}

impl SettlementService {
    pub fn new(fees: FeeConfigStore, catalog: Arc<dyn Catalog>, ledger: LedgerStore) -> Self {
        Self {
            fees,
            catalog,
            ledger,
        }
    }

    /// Commit a licensing transaction at most once per `request_id`
    pub async fn commit(
        &self,
        request: &LicensingRequest,
        request_id: &str,
        caller: &Caller,
    ) -> Result<CommitOutcome> {
        let request_id = request_id.trim();
        if request_id.is_empty() || request_id.len() > MAX_REQUEST_ID_LEN {
            return Err(Error::InvalidInput(format!(
                "request_id must be 1-{} characters",
                MAX_REQUEST_ID_LEN
            )));
        }
        validate_request(request)?;
        require_admin_or_athlete(caller, &request.athlete_id, "commit")?;

        if let Some(existing) = self.ledger.find_by_request(request_id).await? {
            return replay(existing, request, request_id);
        }

        let item = self.catalog.item(&request.item_id).await?;
        let athlete = self.catalog.athlete(&request.athlete_id).await?;
        let config = self.fees.get().await?;
        let priced = price(request, &item, &athlete, &config)?;

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            request_id: request_id.to_string(),
            item_id: request.item_id.clone(),
            athlete_id: request.athlete_id.clone(),
            usage_type: request.usage_type.clone(),
            term_months: request.term_months,
            total_value: priced.total_value,
            athlete_payout: priced.athlete_payout,
            platform_commission: priced.platform_commission,
            status: LedgerStatus::Pending,
            transaction_date: time::now(),
            status_updated_at: None,
        };

        match self.ledger.append(&entry).await? {
            AppendOutcome::Inserted(entry) => {
                info!(
                    entry_id = %entry.id,
                    request_id,
                    item_id = %entry.item_id,
                    athlete_id = %entry.athlete_id,
                    total = %entry.total_value,
                    payout = %entry.athlete_payout,
                    commission = %entry.platform_commission,
                    config_version = config.version,
                    committed_by = %caller.id,
                    "Licensing transaction committed"
                );
                Ok(CommitOutcome {
                    entry,
                    disposition: CommitDisposition::Created,
                })
            }
            // Lost the race on the request id claim
            AppendOutcome::Existing(existing) => replay(existing, request, request_id),
        }
    }

    /// Reconciliation hook: move a PENDING entry to APPROVED or CANCELLED
    pub async fn update_status(
        &self,
        entry_id: Uuid,
        next: LedgerStatus,
        caller: &Caller,
    ) -> Result<LedgerEntry> {
        require_admin(caller, "update ledger status")?;
        self.ledger.update_status(entry_id, next).await
    }
}

fn replay(existing: LedgerEntry, request: &LicensingRequest, request_id: &str) -> Result<CommitOutcome> {
    if !existing.matches_request(request) {
        warn!(
            request_id,
            entry_id = %existing.id,
            "Idempotency key reused with different arguments"
        );
        return Err(Error::InvalidInput(format!(
            "request_id {} was already used for a different transaction",
            request_id
        )));
    }
    info!(request_id, entry_id = %existing.id, "Commit replayed");
    Ok(CommitOutcome {
        entry: existing,
        disposition: CommitDisposition::Replayed,
    })
}
