//! Ledger & statement (extrato) aggregation
//!
//! Read-only. Every statement is one aggregate SQL statement over committed
//! entries, so it observes the ledger either before or after any concurrent
//! commit, never in between. Amounts are summed as stored; nothing is
//! re-derived from fractions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{require_admin, require_admin_or_athlete, Caller};
use crate::ledger::{LedgerStore, LedgerTotals};
use crate::models::{LedgerEntry, LedgerStatus, Statement};
use crate::money::from_cents;
use crate::{Error, Result};

/// Which statuses count when the caller gives no filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementPolicy {
    pub default_statuses: Vec<LedgerStatus>,
}

impl Default for StatementPolicy {
    /// PENDING and APPROVED count; CANCELLED does not
    fn default() -> Self {
        Self {
            default_statuses: vec![LedgerStatus::Pending, LedgerStatus::Approved],
        }
    }
}

impl StatementPolicy {
    /// Statuses to aggregate, deduplicated in canonical order
    pub fn resolve(&self, filter: Option<&[LedgerStatus]>) -> Result<Vec<LedgerStatus>> {
        let requested = match filter {
            Some([]) => {
                return Err(Error::InvalidInput(
                    "status filter must name at least one status".to_string(),
                ))
            }
            Some(statuses) => statuses,
            None => self.default_statuses.as_slice(),
        };
        Ok(LedgerStatus::ALL
            .into_iter()
            .filter(|status| requested.contains(status))
            .collect())
    }
}

fn to_statement(athlete_id: Option<&str>, statuses: Vec<LedgerStatus>, totals: LedgerTotals) -> Statement {
    Statement {
        athlete_id: athlete_id.map(str::to_string),
        statuses,
        balance_total: from_cents(totals.athlete_payout_cents),
        gross_volume: from_cents(totals.total_cents),
        platform_commission_total: from_cents(totals.platform_commission_cents),
        transaction_count: u64::try_from(totals.count).unwrap_or_default(),
    }
}

/// Read path used by dashboards and extratos
#[derive(Clone)]
pub struct StatementService {
    ledger: LedgerStore,
    policy: StatementPolicy,
}

impl StatementService {
    pub fn new(ledger: LedgerStore, policy: StatementPolicy) -> Self {
        Self { ledger, policy }
    }

    pub fn policy(&self) -> &StatementPolicy {
        &self.policy
    }

    /// Extrato for one athlete
    pub async fn statement_for_athlete(
        &self,
        athlete_id: &str,
        filter: Option<&[LedgerStatus]>,
        caller: &Caller,
    ) -> Result<Statement> {
        require_admin_or_athlete(caller, athlete_id, "athlete statement")?;
        let statuses = self.policy.resolve(filter)?;
        let totals = self.ledger.totals(Some(athlete_id), &statuses).await?;
        Ok(to_statement(Some(athlete_id), statuses, totals))
    }

    /// Platform-wide extrato
    pub async fn global_statement(
        &self,
        filter: Option<&[LedgerStatus]>,
        caller: &Caller,
    ) -> Result<Statement> {
        require_admin(caller, "global statement")?;
        let statuses = self.policy.resolve(filter)?;
        let totals = self.ledger.totals(None, &statuses).await?;
        Ok(to_statement(None, statuses, totals))
    }

    /// Ledger listing; unscoped listings are admin-only
    ///
    /// An absent filter lists every status, unlike statements.
    pub async fn list_entries(
        &self,
        athlete_id: Option<&str>,
        filter: Option<&[LedgerStatus]>,
        limit: u32,
        caller: &Caller,
    ) -> Result<Vec<LedgerEntry>> {
        match athlete_id {
            Some(athlete_id) => require_admin_or_athlete(caller, athlete_id, "list ledger entries")?,
            None => require_admin(caller, "list all ledger entries")?,
        }
        let statuses = match filter {
            Some(_) => self.policy.resolve(filter)?,
            None => LedgerStatus::ALL.to_vec(),
        };
        self.ledger.list(athlete_id, &statuses, limit).await
    }

    /// One ledger entry, visible to admins and the athlete it pays
    pub async fn get_entry(&self, id: Uuid, caller: &Caller) -> Result<LedgerEntry> {
        let entry = self.ledger.get(id).await?;
        require_admin_or_athlete(caller, &entry.athlete_id, "read ledger entry")?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LedgerStatus::*;

    #[test]
    fn test_default_policy_excludes_cancelled() {
        let policy = StatementPolicy::default();
        assert_eq!(policy.resolve(None).unwrap(), vec![Pending, Approved]);
    }

    #[test]
    fn test_explicit_filter_overrides_default() {
        let policy = StatementPolicy::default();
        assert_eq!(policy.resolve(Some(&[Cancelled][..])).unwrap(), vec![Cancelled]);
        assert_eq!(
            policy.resolve(Some(&[Approved, Pending, Approved][..])).unwrap(),
            vec![Pending, Approved]
        );
        assert!(matches!(policy.resolve(Some(&[][..])), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_configured_policy() {
        let policy = StatementPolicy {
            default_statuses: vec![Approved],
        };
        assert_eq!(policy.resolve(None).unwrap(), vec![Approved]);
    }

    #[test]
    fn test_to_statement_converts_cents() {
        let totals = LedgerTotals {
            count: 2,
            total_cents: 150_000,
            athlete_payout_cents: 105_000,
            platform_commission_cents: 45_000,
        };
        let statement = to_statement(Some("ath-1"), vec![Pending], totals);
        assert_eq!(statement.balance_total.to_string(), "1050.00");
        assert_eq!(statement.gross_volume.to_string(), "1500.00");
        assert_eq!(statement.platform_commission_total.to_string(), "450.00");
        assert_eq!(statement.transaction_count, 2);
    }
}
