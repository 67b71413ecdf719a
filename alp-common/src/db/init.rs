//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up with
//! idempotent `CREATE ... IF NOT EXISTS` statements. Connection options are
//! applied per connection so every pooled connection gets WAL, foreign keys
//! and the busy timeout.

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the ledger database and ensure the schema exists
pub async fn init_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let db_path = &config.path;
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL allows statement reads concurrently with the single writer
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables, indexes and triggers (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_fee_configuration_table(pool).await?;
    create_fee_configuration_history_table(pool).await?;
    create_athletes_table(pool).await?;
    create_athlete_fee_overrides_table(pool).await?;
    create_licensing_items_table(pool).await?;
    create_ledger_entries_table(pool).await?;
    Ok(())
}

async fn create_fee_configuration_table(pool: &SqlitePool) -> Result<()> {
    // Single row; replaced in place by one UPDATE
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fee_configuration (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            repasse_atleta TEXT NOT NULL,
            comissao_plataforma TEXT NOT NULL,
            legal_note TEXT NOT NULL DEFAULT '',
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            updated_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_fee_configuration_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fee_configuration_history (
            version INTEGER PRIMARY KEY,
            repasse_atleta TEXT NOT NULL,
            comissao_plataforma TEXT NOT NULL,
            legal_note TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL,
            updated_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_athletes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS athletes (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            pix_key TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_athlete_fee_overrides_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS athlete_fee_overrides (
            athlete_id TEXT PRIMARY KEY REFERENCES athletes(id) ON DELETE CASCADE,
            differentiated_commission TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            updated_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_licensing_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS licensing_items (
            id TEXT PRIMARY KEY,
            athlete_id TEXT NOT NULL REFERENCES athletes(id),
            title TEXT NOT NULL,
            base_price_cents INTEGER NOT NULL CHECK (base_price_cents > 0),
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_licensing_items_athlete ON licensing_items(athlete_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ledger_entries_table(pool: &SqlitePool) -> Result<()> {
    // request_id UNIQUE is the idempotency claim for commits
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id TEXT PRIMARY KEY,
            request_id TEXT NOT NULL UNIQUE,
            item_id TEXT NOT NULL,
            athlete_id TEXT NOT NULL,
            usage_type TEXT NOT NULL,
            term_months INTEGER NOT NULL CHECK (term_months > 0),
            total_cents INTEGER NOT NULL CHECK (total_cents > 0),
            athlete_payout_cents INTEGER NOT NULL CHECK (athlete_payout_cents >= 0),
            platform_commission_cents INTEGER NOT NULL CHECK (platform_commission_cents >= 0),
            status TEXT NOT NULL CHECK (status IN ('PENDING', 'APPROVED', 'CANCELLED')),
            transaction_date TEXT NOT NULL,
            status_updated_at TEXT,
            CHECK (total_cents = athlete_payout_cents + platform_commission_cents)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_athlete_status ON ledger_entries(athlete_id, status)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS ledger_entries_amounts_immutable
        BEFORE UPDATE OF id, request_id, item_id, athlete_id, usage_type, term_months,
                         total_cents, athlete_payout_cents, platform_commission_cents,
                         transaction_date
        ON ledger_entries
        BEGIN
            SELECT RAISE(ABORT, 'ledger entries are immutable except for status');
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
