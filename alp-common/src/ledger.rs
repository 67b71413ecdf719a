//! Ledger persistence
//!
//! Append-only store of committed licensing transactions. The UNIQUE
//! constraint on `request_id` is the exclusive claim that makes commits
//! at-most-once: the append is a single INSERT, so a failed commit leaves
//! no row behind and a racing duplicate sees the winner's row.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{LedgerEntry, LedgerStatus};
use crate::money::{from_cents, to_cents};
use crate::time;
use crate::{Error, Result};

const ENTRY_COLUMNS: &str = "id, request_id, item_id, athlete_id, usage_type, term_months, \
     total_cents, athlete_payout_cents, platform_commission_cents, status, \
     transaction_date, status_updated_at";

/// Result of an idempotent append
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// This call created the row
    Inserted(LedgerEntry),
    /// A row with the same request id already existed
    Existing(LedgerEntry),
}

/// Raw sums over a set of ledger entries, in centavos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub count: i64,
    pub total_cents: i64,
    pub athlete_payout_cents: i64,
    pub platform_commission_cents: i64,
}

fn entry_from_row(row: &SqliteRow) -> Result<LedgerEntry> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let term_months: i64 = row.try_get("term_months")?;
    let transaction_date: String = row.try_get("transaction_date")?;
    let status_updated_at: Option<String> = row.try_get("status_updated_at")?;

    Ok(LedgerEntry {
        id: Uuid::parse_str(&id).map_err(|e| Error::Persistence(sqlx::Error::Decode(Box::new(e))))?,
        request_id: row.try_get("request_id")?,
        item_id: row.try_get("item_id")?,
        athlete_id: row.try_get("athlete_id")?,
        usage_type: row.try_get("usage_type")?,
        term_months: u32::try_from(term_months)
            .map_err(|e| Error::Persistence(sqlx::Error::Decode(Box::new(e))))?,
        total_value: from_cents(row.try_get("total_cents")?),
        athlete_payout: from_cents(row.try_get("athlete_payout_cents")?),
        platform_commission: from_cents(row.try_get("platform_commission_cents")?),
        status: LedgerStatus::parse(&status).ok_or_else(|| {
            Error::Persistence(sqlx::Error::Decode(
                format!("unknown ledger status '{}'", status).into(),
            ))
        })?,
        transaction_date: time::from_db(&transaction_date)?,
        status_updated_at: status_updated_at.as_deref().map(time::from_db).transpose()?,
    })
}

/// `IN (?, ?, ...)` placeholder list for `n` values
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Ledger store over the service database
#[derive(Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Entry created for `request_id`, if any
    pub async fn find_by_request(&self, request_id: &str) -> Result<Option<LedgerEntry>> {
        let sql = format!("SELECT {} FROM ledger_entries WHERE request_id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(entry_from_row).transpose()
    }

    /// Entry by id; `Error::NotFound` if absent
    pub async fn get(&self, id: Uuid) -> Result<LedgerEntry> {
        let sql = format!("SELECT {} FROM ledger_entries WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => entry_from_row(&row),
            None => Err(Error::NotFound(format!("ledger entry {}", id))),
        }
    }

    /// Insert `entry` unless its request id was already claimed
    pub async fn append(&self, entry: &LedgerEntry) -> Result<AppendOutcome> {
        let sql = format!(
            "INSERT INTO ledger_entries ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(request_id) DO NOTHING",
            ENTRY_COLUMNS
        );
        let inserted = sqlx::query(&sql)
            .bind(entry.id.to_string())
            .bind(&entry.request_id)
            .bind(&entry.item_id)
            .bind(&entry.athlete_id)
            .bind(&entry.usage_type)
            .bind(i64::from(entry.term_months))
            .bind(to_cents(entry.total_value)?)
            .bind(to_cents(entry.athlete_payout)?)
            .bind(to_cents(entry.platform_commission)?)
            .bind(entry.status.as_str())
            .bind(time::to_db(&entry.transaction_date))
            .bind(entry.status_updated_at.as_ref().map(time::to_db))
            .execute(&self.pool)
            .await?
            .rows_affected();

        if inserted == 1 {
            return Ok(AppendOutcome::Inserted(entry.clone()));
        }

        match self.find_by_request(&entry.request_id).await? {
            Some(existing) => Ok(AppendOutcome::Existing(existing)),
            // Conflict reported but no row visible: treat as storage fault
            None => Err(Error::Persistence(sqlx::Error::RowNotFound)),
        }
    }

    /// Entries newest first, optionally scoped to one athlete and/or statuses
    pub async fn list(
        &self,
        athlete_id: Option<&str>,
        statuses: &[LedgerStatus],
        limit: u32,
    ) -> Result<Vec<LedgerEntry>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let mut sql = format!(
            "SELECT {} FROM ledger_entries WHERE status IN ({})",
            ENTRY_COLUMNS,
            placeholders(statuses.len())
        );
        if athlete_id.is_some() {
            sql.push_str(" AND athlete_id = ?");
        }
        sql.push_str(" ORDER BY transaction_date DESC, id DESC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        if let Some(athlete_id) = athlete_id {
            query = query.bind(athlete_id);
        }
        let rows = query.bind(i64::from(limit)).fetch_all(&self.pool).await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Sums over matching entries, computed by one SQL statement
    pub async fn totals(
        &self,
        athlete_id: Option<&str>,
        statuses: &[LedgerStatus],
    ) -> Result<LedgerTotals> {
        if statuses.is_empty() {
            return Ok(LedgerTotals::default());
        }
        let mut sql = format!(
            "SELECT COUNT(*) AS entry_count, \
                    COALESCE(SUM(total_cents), 0) AS total_cents, \
                    COALESCE(SUM(athlete_payout_cents), 0) AS athlete_payout_cents, \
                    COALESCE(SUM(platform_commission_cents), 0) AS platform_commission_cents \
             FROM ledger_entries WHERE status IN ({})",
            placeholders(statuses.len())
        );
        if athlete_id.is_some() {
            sql.push_str(" AND athlete_id = ?");
        }

        let mut query = sqlx::query(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        if let Some(athlete_id) = athlete_id {
            query = query.bind(athlete_id);
        }
        let row = query.fetch_one(&self.pool).await?;

        Ok(LedgerTotals {
            count: row.try_get("entry_count")?,
            total_cents: row.try_get("total_cents")?,
            athlete_payout_cents: row.try_get("athlete_payout_cents")?,
            platform_commission_cents: row.try_get("platform_commission_cents")?,
        })
    }

    /// Apply a reconciliation status change (PENDING -> APPROVED | CANCELLED)
    pub async fn update_status(&self, id: Uuid, next: LedgerStatus) -> Result<LedgerEntry> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(next) {
            warn!(entry_id = %id, from = %current.status, to = %next, "Rejected ledger status transition");
            return Err(Error::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        // Compare-and-set on the status read above
        let updated = sqlx::query(
            "UPDATE ledger_entries SET status = ?, status_updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(time::to_db(&time::now()))
        .bind(id.to_string())
        .bind(current.status.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            let latest = self.get(id).await?;
            warn!(entry_id = %id, from = %latest.status, to = %next, "Lost ledger status race");
            return Err(Error::InvalidTransition {
                from: latest.status,
                to: next,
            });
        }

        info!(entry_id = %id, from = %current.status, to = %next, "Ledger status updated");
        self.get(id).await
    }
}
