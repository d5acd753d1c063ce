use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use uuid::Uuid;

use abacus_core::holdings::{Holding, HoldingStore};
use abacus_core::ledger::{
    Deposit, LedgerExecutor, LedgerUnitOfWork, NewDeposit, NewTransaction, Transaction,
};
use abacus_core::{Error, Result};

use super::model::{DepositDB, TransactionDB};
use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::holdings::HoldingDB;
use crate::schema::{deposits, holdings, transactions};

/// Runs ledger jobs on the writer actor.
///
/// Each job gets its own `IMMEDIATE` transaction. The reserved lock it takes
/// serializes all writers to the database file, and an `Err` from the job
/// rolls every statement back.
#[derive(Clone)]
pub struct SqliteLedgerExecutor {
    writer: WriteHandle,
}

impl SqliteLedgerExecutor {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl LedgerExecutor for SqliteLedgerExecutor {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerUnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                let mut unit = SqliteUnitOfWork { conn };
                job(&mut unit)
            })
            .await
    }
}

struct SqliteUnitOfWork<'c> {
    conn: &'c mut SqliteConnection,
}

impl SqliteUnitOfWork<'_> {
    fn find(&mut self, portfolio_id: &str, asset_id: &str) -> Result<Option<Holding>> {
        holdings::table
            .filter(holdings::portfolio_id.eq(portfolio_id))
            .filter(holdings::asset_id.eq(asset_id))
            .select(HoldingDB::as_select())
            .first(self.conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Holding::try_from)
            .transpose()
    }
}

impl HoldingStore for SqliteUnitOfWork<'_> {
    fn get_or_create(&mut self, portfolio_id: &str, asset_id: &str) -> Result<Holding> {
        let fresh = Holding::empty(Uuid::new_v4().to_string(), portfolio_id, asset_id);
        diesel::insert_into(holdings::table)
            .values(&HoldingDB::from(&fresh))
            .on_conflict((holdings::portfolio_id, holdings::asset_id))
            .do_nothing()
            .execute(self.conn)
            .map_err(StorageError::from)?;

        self.find(portfolio_id, asset_id)?
            .ok_or_else(|| Error::Unexpected(format!(
                "holding ({}, {}) missing after insert",
                portfolio_id, asset_id
            )))
    }

    fn list_by_portfolio(&mut self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let rows: Vec<HoldingDB> = holdings::table
            .filter(holdings::portfolio_id.eq(portfolio_id))
            .order(holdings::asset_id.asc())
            .select(HoldingDB::as_select())
            .load(self.conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Holding::try_from).collect()
    }

    fn save(&mut self, holding: &Holding) -> Result<Holding> {
        let updated = diesel::update(holdings::table.find(&holding.id))
            .set((
                holdings::quantity.eq(holding.quantity.to_string()),
                holdings::weight.eq(holding.weight.to_string()),
                holdings::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(HoldingDB::as_returning())
            .get_result(self.conn)
            .optional()
            .map_err(StorageError::from)?;

        updated
            .ok_or_else(|| Error::not_found("Holding", holding.id.clone()))
            .and_then(Holding::try_from)
    }

    fn delete_if_empty(&mut self, holding: &Holding) -> Result<bool> {
        if !holding.is_empty() {
            return Ok(false);
        }
        let deleted = diesel::delete(holdings::table.find(&holding.id))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(deleted > 0)
    }
}

impl LedgerUnitOfWork for SqliteUnitOfWork<'_> {
    fn insert_deposit(&mut self, deposit: &NewDeposit) -> Result<Deposit> {
        let row = DepositDB {
            id: Uuid::new_v4().to_string(),
            portfolio_id: deposit.portfolio_id.clone(),
            amount: deposit.amount.to_string(),
            date: deposit.date,
            created_at: Utc::now().naive_utc(),
        };
        let stored = diesel::insert_into(deposits::table)
            .values(&row)
            .returning(DepositDB::as_returning())
            .get_result(self.conn)
            .map_err(StorageError::from)?;
        Deposit::try_from(stored)
    }

    fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Transaction> {
        let row = TransactionDB {
            id: Uuid::new_v4().to_string(),
            portfolio_id: transaction.portfolio_id.clone(),
            asset_id: transaction.asset_id.clone(),
            date: transaction.date,
            transaction_type: transaction.transaction_type.as_str().to_string(),
            value: transaction.value.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        let stored = diesel::insert_into(transactions::table)
            .values(&row)
            .returning(TransactionDB::as_returning())
            .get_result(self.conn)
            .map_err(StorageError::from)?;
        Transaction::try_from(stored)
    }
}
