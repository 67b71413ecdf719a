//! alp-ledger - Licensing revenue-split and ledger service
//!
//! Configuration resolves CLI argument, then `ALP_CONFIG`, then the user
//! or system config file, then compiled defaults. Individual CLI flags
//! override whatever the file says.

use std::net::SocketAddr;
use std::path::PathBuf;

use alp_common::config::{resolve_config_path, LedgerConfig, CONFIG_ENV_VAR};
use alp_common::db::init_database;
use alp_common::LicensingEngine;
use alp_ledger::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for alp-ledger
#[derive(Parser, Debug)]
#[command(name = "alp-ledger")]
#[command(about = "Licensing revenue-split and ledger service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides [database] path)
    #[arg(short, long, env = "ALP_DATABASE")]
    database: Option<PathBuf>,

    /// Port to listen on (overrides [server] port)
    #[arg(short, long, env = "ALP_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides [server] bind)
    #[arg(short, long, env = "ALP_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alp_ledger=info,alp_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting alp-ledger v{}", env!("CARGO_PKG_VERSION"));

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    match &config_path {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    let mut config =
        LedgerConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    if let Some(database) = args.database {
        config.database.path = database;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    info!("Database path: {}", config.database.path.display());
    let pool = init_database(&config.database)
        .await
        .context("Failed to initialize database")?;

    let engine = LicensingEngine::new(pool, config.statements.clone());
    let fees = engine
        .fees
        .bootstrap(&config.fees)
        .await
        .context("Failed to bootstrap fee configuration")?;
    info!(
        version = fees.version,
        repasse = %fees.repasse_atleta_fraction,
        comissao = %fees.comissao_plataforma_fraction,
        "Fee configuration ready"
    );

    let app = build_router(AppState::new(engine));

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("alp-ledger listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
