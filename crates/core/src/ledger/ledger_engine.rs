use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::ledger_errors::LedgerError;
use super::ledger_model::{
    Deposit, DepositReceipt, DepositRequest, NewDeposit, NewTransaction, Transaction,
    TransactionFill, TransactionReceipt, TransactionRequest, TransactionType, WeightAssignment,
};
use super::ledger_traits::{LedgerExecutor, LedgerRepositoryTrait, LedgerServiceTrait};
use crate::assets::AssetRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink, LedgerOperation};
use crate::holdings::{Holding, HoldingChange, HoldingRepositoryTrait, HoldingStore};
use crate::portfolios::PortfolioRepositoryTrait;
use crate::prices::PriceIndex;
use crate::utils::decimal_utils::{cash_to_quantity, checked_product, round_cash, round_weight};

fn require_id(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()).into());
    }
    Ok(value.to_string())
}

fn require_positive(field: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount { field, value }.into());
    }
    Ok(())
}

/// Validates a deposit request and rounds the amount to cash precision.
pub fn build_deposit(request: DepositRequest) -> Result<NewDeposit> {
    let portfolio_id = require_id("portfolioId", &request.portfolio_id)?;
    let amount = round_cash(request.amount);
    require_positive("amount", amount)?;

    Ok(NewDeposit {
        portfolio_id,
        amount,
        date: request.date,
    })
}

/// Validates a transaction request and rounds the value to cash precision.
pub fn build_transaction(request: TransactionRequest) -> Result<NewTransaction> {
    let portfolio_id = require_id("portfolioId", &request.portfolio_id)?;
    let asset_id = require_id("assetId", &request.asset_id)?;
    let value = round_cash(request.value);
    require_positive("value", value)?;

    Ok(NewTransaction {
        portfolio_id,
        asset_id,
        date: request.date,
        transaction_type: request.transaction_type,
        value,
    })
}

/// Validates target weights: each in `[0, 1]` after rounding, each asset once.
pub fn build_weight_assignments(weights: Vec<WeightAssignment>) -> Result<Vec<WeightAssignment>> {
    if weights.is_empty() {
        return Err(ValidationError::InvalidInput(
            "At least one weight assignment is required".to_string(),
        )
        .into());
    }

    let mut seen = HashSet::with_capacity(weights.len());
    let mut normalized = Vec::with_capacity(weights.len());
    for assignment in weights {
        let asset_id = require_id("assetId", &assignment.asset_id)?;
        let weight = round_weight(assignment.weight);
        if weight < Decimal::ZERO || weight > Decimal::ONE {
            return Err(LedgerError::WeightOutOfRange { asset_id, weight }.into());
        }
        if !seen.insert(asset_id.clone()) {
            return Err(LedgerError::DuplicateAsset { asset_id }.into());
        }
        normalized.push(WeightAssignment { asset_id, weight });
    }
    Ok(normalized)
}

fn price_for<P: PriceIndex + ?Sized>(
    prices: &P,
    asset_id: &str,
    date: NaiveDate,
) -> Result<Decimal> {
    let price = prices
        .price_on_date(asset_id, date)?
        .ok_or_else(|| LedgerError::MissingPrice {
            asset_id: asset_id.to_string(),
            date,
        })?;
    if price.price <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "Price of asset {} on {} is not positive",
            asset_id, date
        ))
        .into());
    }
    Ok(price.price)
}

/// Allocates a deposit across the portfolio's holdings by target weight.
///
/// The weights must sum to exactly 1. Holdings are processed in asset id
/// order; zero-weight holdings receive nothing and need no price. The first
/// missing price aborts the allocation, and the caller's unit of work discards
/// the holdings already updated.
pub fn apply_deposit<S, P>(
    store: &mut S,
    prices: &P,
    deposit: &NewDeposit,
) -> Result<Vec<HoldingChange>>
where
    S: HoldingStore + ?Sized,
    P: PriceIndex + ?Sized,
{
    let mut holdings = store.list_by_portfolio(&deposit.portfolio_id)?;
    let total: Decimal = holdings.iter().map(|h| h.weight).sum();
    if total != Decimal::ONE {
        return Err(LedgerError::WeightsNotFullyAllocated {
            portfolio_id: deposit.portfolio_id.clone(),
            total,
        }
        .into());
    }

    holdings.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));

    let mut changes = Vec::with_capacity(holdings.len());
    for mut holding in holdings.into_iter().filter(|h| !h.weight.is_zero()) {
        let price = price_for(prices, &holding.asset_id, deposit.date)?;
        let allocation = checked_product("allocation", deposit.amount, holding.weight)?;
        let bought = cash_to_quantity(allocation, price)?;
        let previous_quantity = holding.quantity;
        holding.adjust_quantity(bought)?;
        let saved = store.save(&holding)?;

        changes.push(HoldingChange {
            asset_id: saved.asset_id,
            previous_quantity,
            quantity: saved.quantity,
            weight: saved.weight,
            removed: false,
        });
    }
    Ok(changes)
}

/// Converts the transaction value to a quantity at the day's price and
/// applies it to the holding.
///
/// A sell may not exceed the quantity held. A holding left with zero quantity
/// and zero weight is deleted.
pub fn apply_transaction<S, P>(
    store: &mut S,
    prices: &P,
    transaction: &NewTransaction,
) -> Result<TransactionFill>
where
    S: HoldingStore + ?Sized,
    P: PriceIndex + ?Sized,
{
    let price = price_for(prices, &transaction.asset_id, transaction.date)?;
    let quantity = cash_to_quantity(transaction.value, price)?;
    if quantity.is_zero() {
        return Err(ValidationError::InvalidInput(format!(
            "Value {} at price {} is below the smallest tradable quantity",
            transaction.value, price
        ))
        .into());
    }

    let mut holding = store.get_or_create(&transaction.portfolio_id, &transaction.asset_id)?;
    let previous_quantity = holding.quantity;
    match transaction.transaction_type {
        TransactionType::Buy => holding.adjust_quantity(quantity)?,
        TransactionType::Sell => {
            if holding.quantity < quantity {
                return Err(LedgerError::InsufficientQuantity {
                    asset_id: transaction.asset_id.clone(),
                    held: holding.quantity,
                    requested: quantity,
                }
                .into());
            }
            holding.adjust_quantity(-quantity)?;
        }
    }

    let removed = if holding.is_empty() {
        store.delete_if_empty(&holding)?
    } else {
        holding = store.save(&holding)?;
        false
    };

    Ok(TransactionFill {
        price,
        quantity,
        change: HoldingChange {
            asset_id: holding.asset_id,
            previous_quantity,
            quantity: holding.quantity,
            weight: holding.weight,
            removed,
        },
    })
}

/// Writes target weights for the listed assets, creating holdings as needed.
///
/// Returns the changes in input order. A holding whose weight drops to zero
/// while its quantity is zero is deleted.
pub fn assign_weights<S>(
    store: &mut S,
    portfolio_id: &str,
    weights: &[WeightAssignment],
) -> Result<Vec<HoldingChange>>
where
    S: HoldingStore + ?Sized,
{
    let mut changes = Vec::with_capacity(weights.len());
    for assignment in weights {
        let mut holding = store.get_or_create(portfolio_id, &assignment.asset_id)?;
        holding.set_weight(assignment.weight);
        let removed = if holding.is_empty() {
            store.delete_if_empty(&holding)?
        } else {
            holding = store.save(&holding)?;
            false
        };
        changes.push(HoldingChange {
            asset_id: holding.asset_id,
            previous_quantity: holding.quantity,
            quantity: holding.quantity,
            weight: holding.weight,
            removed,
        });
    }
    Ok(changes)
}

/// Ledger service. Every mutation is one job on the executor.
pub struct LedgerEngine<E: LedgerExecutor> {
    executor: E,
    prices: Arc<dyn PriceIndex>,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl<E: LedgerExecutor> LedgerEngine<E> {
    pub fn new(
        executor: E,
        prices: Arc<dyn PriceIndex>,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            executor,
            prices,
            portfolio_repository,
            asset_repository,
            holding_repository,
            ledger_repository,
            event_sink,
        }
    }

    fn reject(&self, portfolio_id: &str, operation: LedgerOperation, err: &Error) {
        warn!(
            "Rejected {} for portfolio {}: {}",
            operation.as_str(),
            portfolio_id,
            err
        );
        self.event_sink.emit(DomainEvent::ledger_operation_rejected(
            portfolio_id.to_string(),
            operation,
            err.to_string(),
        ));
    }

    fn removal_events(portfolio_id: &str, changes: &[HoldingChange]) -> Vec<DomainEvent> {
        changes
            .iter()
            .filter(|change| change.removed)
            .map(|change| {
                DomainEvent::holding_removed(portfolio_id.to_string(), change.asset_id.clone())
            })
            .collect()
    }

    async fn record_deposit(&self, request: DepositRequest) -> Result<DepositReceipt> {
        let deposit = build_deposit(request)?;
        self.portfolio_repository.get_by_id(&deposit.portfolio_id)?;

        let prices = self.prices.clone();
        self.executor
            .execute(move |uow| {
                let changes = apply_deposit(&mut *uow, prices.as_ref(), &deposit)?;
                let deposit = uow.insert_deposit(&deposit)?;
                Ok(DepositReceipt { deposit, changes })
            })
            .await
    }

    async fn record_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt> {
        let transaction = build_transaction(request)?;
        self.portfolio_repository.get_by_id(&transaction.portfolio_id)?;
        self.asset_repository.get_by_id(&transaction.asset_id)?;

        let prices = self.prices.clone();
        self.executor
            .execute(move |uow| {
                let fill = apply_transaction(&mut *uow, prices.as_ref(), &transaction)?;
                let transaction =
                    uow.insert_transaction(&transaction, fill.price, fill.quantity)?;
                Ok(TransactionReceipt {
                    transaction,
                    change: fill.change,
                })
            })
            .await
    }

    async fn record_weights(
        &self,
        portfolio_id: &str,
        weights: Vec<WeightAssignment>,
    ) -> Result<(Vec<HoldingChange>, Vec<Holding>)> {
        let weights = build_weight_assignments(weights)?;
        self.portfolio_repository.get_by_id(portfolio_id)?;
        for assignment in &weights {
            self.asset_repository.get_by_id(&assignment.asset_id)?;
        }

        let portfolio_id = portfolio_id.to_string();
        self.executor
            .execute(move |uow| {
                let changes = assign_weights(&mut *uow, &portfolio_id, &weights)?;
                let holdings = uow.list_by_portfolio(&portfolio_id)?;
                Ok((changes, holdings))
            })
            .await
    }
}

#[async_trait::async_trait]
impl<E: LedgerExecutor> LedgerServiceTrait for LedgerEngine<E> {
    async fn create_deposit(&self, request: DepositRequest) -> Result<DepositReceipt> {
        let portfolio_id = request.portfolio_id.clone();
        debug!(
            "Creating deposit of {} for portfolio {} on {}",
            request.amount, portfolio_id, request.date
        );

        match self.record_deposit(request).await {
            Ok(receipt) => {
                let deposit = &receipt.deposit;
                self.event_sink.emit(DomainEvent::deposit_distributed(
                    deposit.portfolio_id.clone(),
                    deposit.id.clone(),
                    deposit.amount,
                    deposit.date,
                    receipt.changes.iter().map(|c| c.asset_id.clone()).collect(),
                ));
                Ok(receipt)
            }
            Err(err) => {
                self.reject(&portfolio_id, LedgerOperation::Deposit, &err);
                Err(err)
            }
        }
    }

    async fn create_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt> {
        let portfolio_id = request.portfolio_id.clone();
        debug!(
            "Creating {} of {} in asset {} for portfolio {}",
            request.transaction_type, request.value, request.asset_id, portfolio_id
        );

        match self.record_transaction(request).await {
            Ok(receipt) => {
                let transaction = &receipt.transaction;
                let mut events = vec![DomainEvent::transaction_applied(
                    transaction.portfolio_id.clone(),
                    transaction.id.clone(),
                    transaction.asset_id.clone(),
                    transaction.transaction_type,
                    transaction.quantity,
                )];
                events.extend(Self::removal_events(
                    &transaction.portfolio_id,
                    std::slice::from_ref(&receipt.change),
                ));
                self.event_sink.emit_batch(events);
                Ok(receipt)
            }
            Err(err) => {
                self.reject(&portfolio_id, LedgerOperation::Transaction, &err);
                Err(err)
            }
        }
    }

    async fn set_target_weights(
        &self,
        portfolio_id: &str,
        weights: Vec<WeightAssignment>,
    ) -> Result<Vec<Holding>> {
        debug!(
            "Setting {} target weights for portfolio {}",
            weights.len(),
            portfolio_id
        );

        match self.record_weights(portfolio_id, weights).await {
            Ok((changes, holdings)) => {
                let mut events = vec![DomainEvent::target_weights_changed(
                    portfolio_id.to_string(),
                    changes.iter().map(|c| c.asset_id.clone()).collect(),
                )];
                events.extend(Self::removal_events(portfolio_id, &changes));
                self.event_sink.emit_batch(events);
                Ok(holdings)
            }
            Err(err) => {
                self.reject(portfolio_id, LedgerOperation::WeightAssignment, &err);
                Err(err)
            }
        }
    }

    fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        self.portfolio_repository.get_by_id(portfolio_id)?;
        self.holding_repository.list_by_portfolio(portfolio_id)
    }

    fn list_deposits(&self, portfolio_id: &str) -> Result<Vec<Deposit>> {
        self.portfolio_repository.get_by_id(portfolio_id)?;
        self.ledger_repository.list_deposits(portfolio_id)
    }

    fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        self.portfolio_repository.get_by_id(portfolio_id)?;
        self.ledger_repository.list_transactions(portfolio_id)
    }
}
