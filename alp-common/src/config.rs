//! Configuration loading and file resolution
//!
//! Resolution order for the configuration file:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file, then system-wide config file
//! 4. Compiled defaults (no file)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::split::Split;
use crate::statement::StatementPolicy;
use crate::{Error, Result};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "ALP_CONFIG";

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub fees: FeeDefaults,
    pub statements: StatementPolicy,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

/// SQLite settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: 10,
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    /// Defaults pointing at a specific database file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Split written at bootstrap when no fee configuration exists yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeDefaults {
    pub repasse: Decimal,
    pub comissao: Decimal,
    pub legal_note: String,
}

impl Default for FeeDefaults {
    fn default() -> Self {
        Self {
            repasse: Decimal::new(70, 2),
            comissao: Decimal::new(30, 2),
            legal_note: String::new(),
        }
    }
}

impl LedgerConfig {
    /// Load from `path`, or compiled defaults when no file was resolved
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                Self::from_str(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        Split::new(self.fees.repasse, self.fees.comissao).map_err(|e| {
            Error::Config(format!("[fees] default split is invalid: {}", e))
        })?;
        if self.statements.default_statuses.is_empty() {
            return Err(Error::Config(
                "[statements] default_statuses must name at least one status".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "[database] max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromStr for LedgerConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }
}

/// Resolve the configuration file to read, if any
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: user then system config file
    let user_config = dirs::config_dir().map(|d| d.join("alp").join("ledger.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }
    let system_config = PathBuf::from("/etc/alp/ledger.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    // Priority 4: compiled defaults
    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("alp").join("ledger.db"))
        .unwrap_or_else(|| PathBuf::from("./alp_data/ledger.db"))
}
