//! Ledger unit-of-work, repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::ledger_model::{
    Deposit, DepositReceipt, DepositRequest, NewDeposit, NewTransaction, Transaction,
    TransactionReceipt, TransactionRequest, WeightAssignment,
};
use crate::errors::Result;
use crate::holdings::{Holding, HoldingStore};

/// Writes available inside one atomic unit of work.
pub trait LedgerUnitOfWork: HoldingStore {
    fn insert_deposit(&mut self, deposit: &NewDeposit) -> Result<Deposit>;

    /// Records a transaction with the price and quantity it was filled at.
    fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Transaction>;
}

/// Runs ledger jobs atomically and one at a time.
///
/// A job that returns `Err` leaves no trace: every write it made through the
/// unit of work is discarded. Jobs never observe each other's partial state.
#[async_trait]
pub trait LedgerExecutor: Send + Sync {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerUnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static;
}

/// Read access to recorded deposits and transactions.
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Deposits of the portfolio ordered by date, then creation time.
    fn list_deposits(&self, portfolio_id: &str) -> Result<Vec<Deposit>>;

    /// Transactions of the portfolio ordered by date, then creation time.
    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Records the deposit and allocates it across the portfolio's holdings
    /// by target weight.
    async fn create_deposit(&self, request: DepositRequest) -> Result<DepositReceipt>;

    /// Records a buy or sell and adjusts the holding's quantity.
    async fn create_transaction(&self, request: TransactionRequest)
        -> Result<TransactionReceipt>;

    /// Sets target weights for the listed assets. Holdings not listed keep
    /// their weight. Returns the portfolio's holdings afterwards.
    async fn set_target_weights(
        &self,
        portfolio_id: &str,
        weights: Vec<WeightAssignment>,
    ) -> Result<Vec<Holding>>;

    fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    fn list_deposits(&self, portfolio_id: &str) -> Result<Vec<Deposit>>;

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;
}
