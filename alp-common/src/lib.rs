//! # ALP Common Library
//!
//! Licensing revenue-split and ledger engine shared by the ALP services:
//! - Fee configuration store (global split + per-athlete overrides)
//! - Split calculator (fixed-point, exact reconciliation)
//! - Simulation and settlement (idempotent commit) services
//! - Ledger persistence and statement (extrato) aggregation
//! - Configuration loading and database initialization

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod fees;
pub mod ledger;
pub mod models;
pub mod money;
pub mod settlement;
pub mod simulation;
pub mod split;
pub mod statement;
pub mod time;

pub use auth::{Caller, Role};
pub use engine::LicensingEngine;
pub use error::{Error, Result};
pub use models::{LedgerEntry, LedgerStatus, SimulationResult, Statement};
pub use settlement::{CommitDisposition, CommitOutcome, SettlementService};
pub use simulation::SimulationService;
