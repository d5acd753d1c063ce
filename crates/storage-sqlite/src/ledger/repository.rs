use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use abacus_core::ledger::{Deposit, LedgerRepositoryTrait, Transaction};
use abacus_core::Result;

use super::model::{DepositDB, TransactionDB};
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::{deposits, transactions};

pub struct LedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    fn list_deposits(&self, portfolio_id: &str) -> Result<Vec<Deposit>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<DepositDB> = deposits::table
            .filter(deposits::portfolio_id.eq(portfolio_id))
            .order((deposits::date.asc(), deposits::created_at.asc()))
            .select(DepositDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Deposit::try_from).collect()
    }

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<TransactionDB> = transactions::table
            .filter(transactions::portfolio_id.eq(portfolio_id))
            .order((transactions::date.asc(), transactions::created_at.asc()))
            .select(TransactionDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Transaction::try_from).collect()
    }
}
