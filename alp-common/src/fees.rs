//! Fee configuration store
//!
//! Holds the global split as a versioned single-row record and the optional
//! per-athlete commission overrides. Repasse and comissão are only ever
//! written together, in one UPDATE, so no reader can observe a mismatched
//! pair. Every accepted change is appended to `fee_configuration_history`
//! in the same transaction.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{require_admin, Caller};
use crate::config::FeeDefaults;
use crate::models::{AthleteFeeOverride, FeeConfiguration};
use crate::money::{fraction_from_db, fraction_to_db};
use crate::split::Split;
use crate::time;
use crate::{Error, Result};

/// Actor recorded for the bootstrap row
pub const BOOTSTRAP_ACTOR: &str = "system:bootstrap";

type FeeRow = (String, String, String, i64, String, String);

fn fee_from_row(row: FeeRow) -> Result<FeeConfiguration> {
    Ok(FeeConfiguration {
        repasse_atleta_fraction: fraction_from_db(&row.0)?,
        comissao_plataforma_fraction: fraction_from_db(&row.1)?,
        legal_note: row.2,
        version: row.3,
        updated_at: time::from_db(&row.4)?,
        updated_by: row.5,
    })
}

/// Store for the global split and athlete overrides
#[derive(Clone)]
pub struct FeeConfigStore {
    pool: SqlitePool,
}

impl FeeConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the singleton from `defaults` unless it already exists
    pub async fn bootstrap(&self, defaults: &FeeDefaults) -> Result<FeeConfiguration> {
        let split = Split::new(defaults.repasse, defaults.comissao)?;
        let now = time::to_db(&time::now());

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO fee_configuration
                (id, repasse_atleta, comissao_plataforma, legal_note, version, updated_at, updated_by)
            VALUES (1, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(fraction_to_db(split.repasse()))
        .bind(fraction_to_db(split.comissao()))
        .bind(&defaults.legal_note)
        .bind(&now)
        .bind(BOOTSTRAP_ACTOR)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 1 {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO fee_configuration_history
                    (version, repasse_atleta, comissao_plataforma, legal_note, updated_at, updated_by)
                VALUES (1, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(fraction_to_db(split.repasse()))
            .bind(fraction_to_db(split.comissao()))
            .bind(&defaults.legal_note)
            .bind(&now)
            .bind(BOOTSTRAP_ACTOR)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        let current = self.get().await?;
        if inserted == 1 {
            info!(
                repasse = %current.repasse_atleta_fraction,
                comissao = %current.comissao_plataforma_fraction,
                "Bootstrapped fee configuration"
            );
        } else {
            info!(
                version = current.version,
                repasse = %current.repasse_atleta_fraction,
                comissao = %current.comissao_plataforma_fraction,
                "Loaded fee configuration"
            );
        }
        Ok(current)
    }

    /// Current global configuration
    pub async fn get(&self) -> Result<FeeConfiguration> {
        let row: Option<FeeRow> = sqlx::query_as(
            r#"
            SELECT repasse_atleta, comissao_plataforma, legal_note, version, updated_at, updated_by
            FROM fee_configuration WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => fee_from_row(row),
            None => Err(Error::Config(
                "fee configuration has not been bootstrapped".to_string(),
            )),
        }
    }

    /// Atomically replace both fractions; rejects pairs not summing to 1
    pub async fn replace(
        &self,
        repasse: Decimal,
        comissao: Decimal,
        legal_note: &str,
        caller: &Caller,
    ) -> Result<FeeConfiguration> {
        require_admin(caller, "replace fee configuration")?;

        let split = Split::new(repasse, comissao).map_err(|e| {
            warn!(caller = %caller.id, %repasse, %comissao, "Rejected fee configuration: {}", e);
            e
        })?;
        let now = time::to_db(&time::now());

        let mut tx = self.pool.begin().await?;
        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE fee_configuration
            SET repasse_atleta = ?, comissao_plataforma = ?, legal_note = ?,
                version = version + 1, updated_at = ?, updated_by = ?
            WHERE id = 1
            RETURNING version
            "#,
        )
        .bind(fraction_to_db(split.repasse()))
        .bind(fraction_to_db(split.comissao()))
        .bind(legal_note)
        .bind(&now)
        .bind(&caller.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(version) = version else {
            return Err(Error::Config(
                "fee configuration has not been bootstrapped".to_string(),
            ));
        };

        sqlx::query(
            r#"
            INSERT INTO fee_configuration_history
                (version, repasse_atleta, comissao_plataforma, legal_note, updated_at, updated_by)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(version)
        .bind(fraction_to_db(split.repasse()))
        .bind(fraction_to_db(split.comissao()))
        .bind(legal_note)
        .bind(&now)
        .bind(&caller.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            version,
            repasse = %split.repasse(),
            comissao = %split.comissao(),
            updated_by = %caller.id,
            "Fee configuration replaced"
        );
        // Built from this transaction's writes, not re-read: a concurrent
        // replace may already have superseded them
        Ok(FeeConfiguration {
            repasse_atleta_fraction: split.repasse(),
            comissao_plataforma_fraction: split.comissao(),
            legal_note: legal_note.to_string(),
            version,
            updated_at: time::from_db(&now)?,
            updated_by: caller.id.clone(),
        })
    }

    /// Past configurations, newest first
    pub async fn history(&self, caller: &Caller, limit: u32) -> Result<Vec<FeeConfiguration>> {
        require_admin(caller, "read fee history")?;

        let rows: Vec<FeeRow> = sqlx::query_as(
            r#"
            SELECT repasse_atleta, comissao_plataforma, legal_note, version, updated_at, updated_by
            FROM fee_configuration_history
            ORDER BY version DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(fee_from_row).collect()
    }

    /// Override lookup for one athlete
    pub async fn athlete_override(&self, athlete_id: &str) -> Result<Option<AthleteFeeOverride>> {
        let row: Option<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT athlete_id, differentiated_commission, updated_at, updated_by
            FROM athlete_fee_overrides WHERE athlete_id = ?
            "#,
        )
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(athlete_id, commission, updated_at, updated_by)| {
            Ok(AthleteFeeOverride {
                athlete_id,
                differentiated_commission_fraction: fraction_from_db(&commission)?,
                updated_at: time::from_db(&updated_at)?,
                updated_by,
            })
        })
        .transpose()
    }

    /// Create or update the platform commission for one athlete
    pub async fn set_athlete_override(
        &self,
        athlete_id: &str,
        commission: Decimal,
        caller: &Caller,
    ) -> Result<AthleteFeeOverride> {
        require_admin(caller, "set athlete fee override")?;
        let split = Split::from_commission(commission)?;
        self.ensure_athlete_exists(athlete_id).await?;

        let now = time::now();
        sqlx::query(
            r#"
            INSERT INTO athlete_fee_overrides (athlete_id, differentiated_commission, updated_at, updated_by)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(athlete_id) DO UPDATE SET
                differentiated_commission = excluded.differentiated_commission,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(athlete_id)
        .bind(fraction_to_db(split.comissao()))
        .bind(time::to_db(&now))
        .bind(&caller.id)
        .execute(&self.pool)
        .await?;

        info!(
            athlete_id,
            commission = %split.comissao(),
            updated_by = %caller.id,
            "Athlete fee override set"
        );
        Ok(AthleteFeeOverride {
            athlete_id: athlete_id.to_string(),
            differentiated_commission_fraction: split.comissao(),
            updated_at: now,
            updated_by: caller.id.clone(),
        })
    }

    /// Remove an athlete's override; returns whether one existed
    pub async fn clear_athlete_override(&self, athlete_id: &str, caller: &Caller) -> Result<bool> {
        require_admin(caller, "clear athlete fee override")?;
        self.ensure_athlete_exists(athlete_id).await?;

        let removed = sqlx::query("DELETE FROM athlete_fee_overrides WHERE athlete_id = ?")
            .bind(athlete_id)
            .execute(&self.pool)
            .await?
            .rows_affected()
            > 0;

        info!(athlete_id, removed, updated_by = %caller.id, "Athlete fee override cleared");
        Ok(removed)
    }

    async fn ensure_athlete_exists(&self, athlete_id: &str) -> Result<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM athletes WHERE id = ?")
            .bind(athlete_id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("athlete {}", athlete_id))),
        }
    }
}

