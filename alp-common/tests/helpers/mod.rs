//! Shared fixtures for alp-common integration tests

#![allow(dead_code)]

use alp_common::catalog::{AthleteProfile, ItemListing};
use alp_common::config::{DatabaseConfig, FeeDefaults};
use alp_common::db::init_database;
use alp_common::models::LicensingRequest;
use alp_common::statement::StatementPolicy;
use alp_common::{Caller, LicensingEngine};
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

pub struct TestLedger {
    pub engine: LicensingEngine,
    pub pool: sqlx::SqlitePool,
    // Dropping removes the database directory
    _dir: TempDir,
}

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn admin() -> Caller {
    Caller::admin("admin-1")
}

/// Fresh database with the 70/30 default split bootstrapped
pub async fn setup() -> TestLedger {
    setup_with_policy(StatementPolicy::default()).await
}

pub async fn setup_with_policy(policy: StatementPolicy) -> TestLedger {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = init_database(&DatabaseConfig::at(dir.path().join("ledger.db")))
        .await
        .expect("database init");
    let engine = LicensingEngine::new(pool.clone(), policy);
    engine
        .fees
        .bootstrap(&FeeDefaults::default())
        .await
        .expect("fee bootstrap");

    TestLedger {
        engine,
        pool,
        _dir: dir,
    }
}

impl TestLedger {
    /// Register an athlete and one item priced at `price`
    pub async fn seed(&self, athlete_id: &str, item_id: &str, price: &str) {
        self.engine
            .catalog
            .upsert_athlete(
                athlete_id,
                &AthleteProfile {
                    display_name: format!("Athlete {}", athlete_id),
                    pix_key: format!("{}@pix", athlete_id),
                },
                &admin(),
            )
            .await
            .expect("athlete upsert");
        self.engine
            .catalog
            .upsert_item(
                item_id,
                &ItemListing {
                    athlete_id: athlete_id.to_string(),
                    title: format!("Item {}", item_id),
                    base_price: d(price),
                },
                &admin(),
            )
            .await
            .expect("item upsert");
    }

    pub async fn ledger_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn request(item_id: &str, athlete_id: &str) -> LicensingRequest {
    LicensingRequest {
        item_id: item_id.to_string(),
        athlete_id: athlete_id.to_string(),
        usage_type: "advertising".to_string(),
        term_months: 12,
    }
}
