use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use abacus_core::holdings::{Holding, HoldingRepositoryTrait};
use abacus_core::Result;

use super::model::HoldingDB;
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::holdings;

/// Snapshot reads of holdings. Writes only happen inside a ledger unit of
/// work, see [`crate::ledger::SqliteLedgerExecutor`].
pub struct HoldingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl HoldingRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl HoldingRepositoryTrait for HoldingRepository {
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<HoldingDB> = holdings::table
            .filter(holdings::portfolio_id.eq(portfolio_id))
            .order(holdings::asset_id.asc())
            .select(HoldingDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Holding::try_from).collect()
    }

    fn get_holding(&self, portfolio_id: &str, asset_id: &str) -> Result<Option<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        holdings::table
            .filter(holdings::portfolio_id.eq(portfolio_id))
            .filter(holdings::asset_id.eq(asset_id))
            .select(HoldingDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Holding::try_from)
            .transpose()
    }
}
