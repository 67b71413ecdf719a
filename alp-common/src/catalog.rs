//! Item/athlete catalog
//!
//! The engine reads base prices, titles, pix keys and commission overrides
//! through the [`Catalog`] trait and never mutates catalog data while
//! pricing. [`SqliteCatalog`] serves the catalog from the ledger database
//! and carries the admin upserts used during athlete onboarding.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{require_admin, Caller};
use crate::models::{Athlete, LicensingItem};
use crate::money::{fraction_from_db, from_cents, normalize_amount, to_cents};
use crate::time;
use crate::{Error, Result};

/// Read-only catalog lookups used by simulation and settlement
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Item by id; `Error::NotFound` if absent
    async fn item(&self, item_id: &str) -> Result<LicensingItem>;

    /// Athlete by id, including any commission override; `Error::NotFound` if absent
    async fn athlete(&self, athlete_id: &str) -> Result<Athlete>;
}

/// Athlete fields editable by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub display_name: String,
    #[serde(default)]
    pub pix_key: String,
}

/// Item fields editable by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListing {
    pub athlete_id: String,
    pub title: String,
    pub base_price: Decimal,
}

/// Catalog backed by the service database
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or update an athlete
    pub async fn upsert_athlete(
        &self,
        athlete_id: &str,
        profile: &AthleteProfile,
        caller: &Caller,
    ) -> Result<Athlete> {
        require_admin(caller, "upsert athlete")?;
        if athlete_id.trim().is_empty() {
            return Err(Error::InvalidInput("athlete id must not be empty".to_string()));
        }
        if profile.display_name.trim().is_empty() {
            return Err(Error::InvalidInput("display_name must not be empty".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO athletes (id, display_name, pix_key, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                pix_key = excluded.pix_key,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(athlete_id)
        .bind(&profile.display_name)
        .bind(&profile.pix_key)
        .bind(time::to_db(&time::now()))
        .execute(&self.pool)
        .await?;

        info!(athlete_id, updated_by = %caller.id, "Athlete upserted");
        self.athlete(athlete_id).await
    }

    /// Create or update a licensing item
    pub async fn upsert_item(
        &self,
        item_id: &str,
        listing: &ItemListing,
        caller: &Caller,
    ) -> Result<LicensingItem> {
        require_admin(caller, "upsert item")?;
        if item_id.trim().is_empty() {
            return Err(Error::InvalidInput("item id must not be empty".to_string()));
        }
        if listing.base_price <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "base_price must be positive, got {}",
                listing.base_price
            )));
        }
        let base_price = normalize_amount(listing.base_price, "base_price")?;
        // Owner must exist before the item can reference it
        self.athlete(&listing.athlete_id).await?;

        sqlx::query(
            r#"
            INSERT INTO licensing_items (id, athlete_id, title, base_price_cents, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                athlete_id = excluded.athlete_id,
                title = excluded.title,
                base_price_cents = excluded.base_price_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(item_id)
        .bind(&listing.athlete_id)
        .bind(&listing.title)
        .bind(to_cents(base_price)?)
        .bind(time::to_db(&time::now()))
        .execute(&self.pool)
        .await?;

        info!(item_id, athlete_id = %listing.athlete_id, %base_price, "Item upserted");
        self.item(item_id).await
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn item(&self, item_id: &str) -> Result<LicensingItem> {
        let row: Option<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, athlete_id, title, base_price_cents FROM licensing_items WHERE id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, athlete_id, title, cents) =
            row.ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;
        Ok(LicensingItem {
            id,
            athlete_id,
            title,
            base_price: from_cents(cents),
        })
    }

    async fn athlete(&self, athlete_id: &str) -> Result<Athlete> {
        let row: Option<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT a.id, a.display_name, a.pix_key, o.differentiated_commission
            FROM athletes a
            LEFT JOIN athlete_fee_overrides o ON o.athlete_id = a.id
            WHERE a.id = ?
            "#,
        )
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, display_name, pix_key, commission) =
            row.ok_or_else(|| Error::NotFound(format!("athlete {}", athlete_id)))?;
        Ok(Athlete {
            id,
            display_name,
            pix_key,
            commission_override: commission.as_deref().map(fraction_from_db).transpose()?,
        })
    }
}
