//! Wiring of the licensing services over one database pool

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::{Catalog, SqliteCatalog};
use crate::fees::FeeConfigStore;
use crate::ledger::LedgerStore;
use crate::settlement::SettlementService;
use crate::simulation::SimulationService;
use crate::statement::{StatementPolicy, StatementService};

/// All licensing services, sharing one pool and one catalog
#[derive(Clone)]
pub struct LicensingEngine {
    pub fees: FeeConfigStore,
    pub catalog: SqliteCatalog,
    pub simulation: SimulationService,
    pub settlement: SettlementService,
    pub statements: StatementService,
}

impl LicensingEngine {
    pub fn new(pool: SqlitePool, policy: StatementPolicy) -> Self {
        let fees = FeeConfigStore::new(pool.clone());
        let catalog = SqliteCatalog::new(pool.clone());
        let ledger = LedgerStore::new(pool);
        let lookup: Arc<dyn Catalog> = Arc::new(catalog.clone());

        Self {
            simulation: SimulationService::new(fees.clone(), lookup.clone()),
            settlement: SettlementService::new(fees.clone(), lookup, ledger.clone()),
            statements: StatementService::new(ledger, policy),
            fees,
            catalog,
        }
    }
}
