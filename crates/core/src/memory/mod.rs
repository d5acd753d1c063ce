//! In-memory implementation of every repository trait and of
//! [`LedgerExecutor`].
//!
//! A unit of work runs on a copy of the ledger state while holding the ledger
//! mutex; the copy replaces the state only if the job succeeds. Prices,
//! portfolios and assets live behind their own locks so a job can look up
//! prices without touching the ledger lock.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::assets::{Asset, AssetRepositoryTrait, AssetUpdate, NewAsset};
use crate::errors::{DatabaseError, Error, Result};
use crate::holdings::{Holding, HoldingRepositoryTrait, HoldingStore};
use crate::ledger::{
    Deposit, LedgerExecutor, LedgerRepositoryTrait, LedgerUnitOfWork, NewDeposit,
    NewTransaction, Transaction,
};
use crate::portfolios::{NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioUpdate};
use crate::prices::{NewPrice, Price, PriceIndex, PriceRepositoryTrait};

#[derive(Clone, Default)]
struct LedgerState {
    /// Keyed by (portfolio id, asset id).
    holdings: BTreeMap<(String, String), Holding>,
    deposits: Vec<Deposit>,
    transactions: Vec<Transaction>,
}

#[derive(Default)]
struct Inner {
    ledger: Mutex<LedgerState>,
    portfolios: RwLock<BTreeMap<String, Portfolio>>,
    assets: RwLock<BTreeMap<String, Asset>>,
    /// Keyed by (asset id, date).
    prices: RwLock<BTreeMap<(String, NaiveDate), Price>>,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

fn poisoned(what: &str) -> Error {
    Error::Database(DatabaseError::Internal(format!("{} lock poisoned", what)))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.inner.ledger.lock().map_err(|_| poisoned("ledger"))
    }

    fn read_portfolios(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Portfolio>>> {
        self.inner.portfolios.read().map_err(|_| poisoned("portfolios"))
    }

    fn write_portfolios(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Portfolio>>> {
        self.inner.portfolios.write().map_err(|_| poisoned("portfolios"))
    }

    fn read_assets(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Asset>>> {
        self.inner.assets.read().map_err(|_| poisoned("assets"))
    }

    fn read_prices(&self) -> Result<RwLockReadGuard<'_, BTreeMap<(String, NaiveDate), Price>>> {
        self.inner.prices.read().map_err(|_| poisoned("prices"))
    }
}

struct MemoryUnitOfWork<'a> {
    state: &'a mut LedgerState,
}

impl HoldingStore for MemoryUnitOfWork<'_> {
    fn get_or_create(&mut self, portfolio_id: &str, asset_id: &str) -> Result<Holding> {
        let holding = self
            .state
            .holdings
            .entry((portfolio_id.to_string(), asset_id.to_string()))
            .or_insert_with(|| Holding::empty(new_id(), portfolio_id, asset_id));
        Ok(holding.clone())
    }

    fn list_by_portfolio(&mut self, portfolio_id: &str) -> Result<Vec<Holding>> {
        Ok(self
            .state
            .holdings
            .values()
            .filter(|h| h.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    fn save(&mut self, holding: &Holding) -> Result<Holding> {
        let key = (holding.portfolio_id.clone(), holding.asset_id.clone());
        let stored = self
            .state
            .holdings
            .get_mut(&key)
            .ok_or_else(|| Error::not_found("Holding", holding.id.clone()))?;
        stored.quantity = holding.quantity;
        stored.weight = holding.weight;
        stored.updated_at = Utc::now().naive_utc();
        Ok(stored.clone())
    }

    fn delete_if_empty(&mut self, holding: &Holding) -> Result<bool> {
        if !holding.is_empty() {
            return Ok(false);
        }
        let key = (holding.portfolio_id.clone(), holding.asset_id.clone());
        Ok(self.state.holdings.remove(&key).is_some())
    }
}

impl LedgerUnitOfWork for MemoryUnitOfWork<'_> {
    fn insert_deposit(&mut self, deposit: &NewDeposit) -> Result<Deposit> {
        let deposit = Deposit {
            id: new_id(),
            portfolio_id: deposit.portfolio_id.clone(),
            amount: deposit.amount,
            date: deposit.date,
            created_at: Utc::now().naive_utc(),
        };
        self.state.deposits.push(deposit.clone());
        Ok(deposit)
    }

    fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Transaction> {
        let transaction = Transaction {
            id: new_id(),
            portfolio_id: transaction.portfolio_id.clone(),
            asset_id: transaction.asset_id.clone(),
            date: transaction.date,
            transaction_type: transaction.transaction_type,
            value: transaction.value,
            quantity,
            price,
            created_at: Utc::now().naive_utc(),
        };
        self.state.transactions.push(transaction.clone());
        Ok(transaction)
    }
}

#[async_trait]
impl LedgerExecutor for InMemoryStore {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerUnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut state = self.ledger()?;
        let mut draft = state.clone();
        // A panicking job is discarded like a failed one; the lock stays usable.
        let output = panic::catch_unwind(AssertUnwindSafe(|| {
            job(&mut MemoryUnitOfWork { state: &mut draft })
        }))
        .map_err(|_| Error::Unexpected("ledger job panicked".to_string()))??;
        *state = draft;
        Ok(output)
    }
}

impl HoldingRepositoryTrait for InMemoryStore {
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        Ok(self
            .ledger()?
            .holdings
            .values()
            .filter(|h| h.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    fn get_holding(&self, portfolio_id: &str, asset_id: &str) -> Result<Option<Holding>> {
        let key = (portfolio_id.to_string(), asset_id.to_string());
        Ok(self.ledger()?.holdings.get(&key).cloned())
    }
}

impl LedgerRepositoryTrait for InMemoryStore {
    fn list_deposits(&self, portfolio_id: &str) -> Result<Vec<Deposit>> {
        let mut deposits: Vec<Deposit> = self
            .ledger()?
            .deposits
            .iter()
            .filter(|d| d.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        deposits.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
        Ok(deposits)
    }

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .ledger()?
            .transactions
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
        Ok(transactions)
    }
}

impl PriceIndex for InMemoryStore {
    fn latest_price(&self, asset_id: &str) -> Result<Option<Price>> {
        Ok(self
            .read_prices()?
            .values()
            .filter(|p| p.asset_id == asset_id)
            .max_by_key(|p| p.date)
            .cloned())
    }

    fn price_on_date(&self, asset_id: &str, date: NaiveDate) -> Result<Option<Price>> {
        Ok(self
            .read_prices()?
            .get(&(asset_id.to_string(), date))
            .cloned())
    }

    fn prices_on_date(&self, asset_ids: &[String], date: NaiveDate) -> Result<Vec<Price>> {
        let prices = self.read_prices()?;
        Ok(asset_ids
            .iter()
            .filter_map(|id| prices.get(&(id.clone(), date)).cloned())
            .collect())
    }

    fn prices_in_range(
        &self,
        asset_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Price>> {
        let mut found: Vec<Price> = self
            .read_prices()?
            .values()
            .filter(|p| p.date >= start && p.date <= end && asset_ids.contains(&p.asset_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.asset_id.cmp(&b.asset_id)));
        Ok(found)
    }
}

#[async_trait]
impl PriceRepositoryTrait for InMemoryStore {
    async fn upsert_price(&self, new_price: NewPrice) -> Result<Price> {
        let mut prices = self.inner.prices.write().map_err(|_| poisoned("prices"))?;
        let key = (new_price.asset_id.clone(), new_price.date);
        let id = prices.get(&key).map(|p| p.id.clone()).unwrap_or_else(new_id);
        let price = Price {
            id,
            asset_id: new_price.asset_id,
            date: new_price.date,
            price: new_price.price,
            updated_at: Utc::now().naive_utc(),
        };
        prices.insert(key, price.clone());
        Ok(price)
    }

    fn list_prices_for_asset(&self, asset_id: &str) -> Result<Vec<Price>> {
        // BTreeMap order is (asset id, date), so this is already date ascending.
        Ok(self
            .read_prices()?
            .values()
            .filter(|p| p.asset_id == asset_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for InMemoryStore {
    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let now = Utc::now().naive_utc();
        let portfolio = Portfolio {
            id: new_portfolio.id.unwrap_or_else(new_id),
            name: new_portfolio.name,
            description: new_portfolio.description,
            created_at: now,
            updated_at: now,
        };
        let mut portfolios = self.write_portfolios()?;
        if portfolios.contains_key(&portfolio.id) {
            return Err(DatabaseError::UniqueViolation(format!(
                "portfolio {} already exists",
                portfolio.id
            ))
            .into());
        }
        portfolios.insert(portfolio.id.clone(), portfolio.clone());
        Ok(portfolio)
    }

    async fn update(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio> {
        let id = portfolio_update.id.unwrap_or_default();
        let mut portfolios = self.write_portfolios()?;
        let portfolio = portfolios
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Portfolio", id.clone()))?;
        portfolio.name = portfolio_update.name;
        portfolio.description = portfolio_update.description;
        portfolio.updated_at = Utc::now().naive_utc();
        Ok(portfolio.clone())
    }

    async fn delete(&self, portfolio_id: &str) -> Result<usize> {
        let mut ledger = self.ledger()?;
        let removed = self.write_portfolios()?.remove(portfolio_id).is_some();
        if removed {
            ledger.holdings.retain(|(pid, _), _| pid != portfolio_id);
            ledger.deposits.retain(|d| d.portfolio_id != portfolio_id);
            ledger.transactions.retain(|t| t.portfolio_id != portfolio_id);
        }
        Ok(usize::from(removed))
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.read_portfolios()?
            .get(portfolio_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Portfolio", portfolio_id))
    }

    fn list(&self) -> Result<Vec<Portfolio>> {
        let mut portfolios: Vec<Portfolio> = self.read_portfolios()?.values().cloned().collect();
        portfolios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(portfolios)
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryStore {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let asset = Asset {
            id: new_asset.id.unwrap_or_else(new_id),
            name: new_asset.name,
            created_at: Utc::now().naive_utc(),
        };
        let mut assets = self.inner.assets.write().map_err(|_| poisoned("assets"))?;
        if assets.contains_key(&asset.id) {
            return Err(DatabaseError::UniqueViolation(format!(
                "asset {} already exists",
                asset.id
            ))
            .into());
        }
        assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    async fn update(&self, asset_update: AssetUpdate) -> Result<Asset> {
        let id = asset_update.id.unwrap_or_default();
        let mut assets = self.inner.assets.write().map_err(|_| poisoned("assets"))?;
        let asset = assets
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Asset", id.clone()))?;
        asset.name = asset_update.name;
        Ok(asset.clone())
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.read_assets()?
            .get(asset_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut assets: Vec<Asset> = self.read_assets()?.values().cloned().collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assets)
    }

    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let assets = self.read_assets()?;
        Ok(asset_ids
            .iter()
            .filter_map(|id| assets.get(id).cloned())
            .collect())
    }
}
