use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::valuation_model::PortfolioDailyValue;
use super::valuation_traits::ValuationServiceTrait;
use crate::assets::AssetRepositoryTrait;
use crate::errors::{Result, ValidationError};
use crate::holdings::{Holding, HoldingRepositoryTrait};
use crate::portfolios::PortfolioRepositoryTrait;
use crate::prices::{Price, PriceIndex};
use crate::utils::decimal_utils::{checked_product, checked_sum};

/// Read-only valuation. Never writes and never goes through the ledger
/// executor, so a valuation may interleave with concurrent ledger writes.
pub struct ValuationService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    prices: Arc<dyn PriceIndex>,
}

impl ValuationService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        prices: Arc<dyn PriceIndex>,
    ) -> Self {
        Self {
            portfolio_repository,
            holding_repository,
            asset_repository,
            prices,
        }
    }

    /// Holdings of an existing portfolio with the display name of each asset.
    fn load_holdings(&self, portfolio_id: &str) -> Result<(Vec<Holding>, HashMap<String, String>)> {
        self.portfolio_repository.get_by_id(portfolio_id)?;
        let holdings = self.holding_repository.list_by_portfolio(portfolio_id)?;
        let asset_ids: Vec<String> = holdings.iter().map(|h| h.asset_id.clone()).collect();
        let names = self
            .asset_repository
            .list_by_asset_ids(&asset_ids)?
            .into_iter()
            .map(|asset| (asset.id, asset.name))
            .collect();
        Ok((holdings, names))
    }
}

fn value_on(
    date: NaiveDate,
    holdings: &[Holding],
    names: &HashMap<String, String>,
    prices: &[Price],
) -> Result<PortfolioDailyValue> {
    let price_by_asset: HashMap<&str, Decimal> = prices
        .iter()
        .filter(|p| p.date == date)
        .map(|p| (p.asset_id.as_str(), p.price))
        .collect();

    let mut value = Decimal::ZERO;
    let mut weights = BTreeMap::new();
    for holding in holdings {
        let Some(price) = price_by_asset.get(holding.asset_id.as_str()) else {
            continue;
        };
        let position = checked_product("value", holding.quantity, *price)?;
        value = checked_sum("value", value, position)?;
        let name = names
            .get(&holding.asset_id)
            .cloned()
            .unwrap_or_else(|| holding.asset_id.clone());
        weights.insert(name, holding.weight);
    }

    Ok(PortfolioDailyValue {
        date,
        value,
        weights,
    })
}

impl ValuationServiceTrait for ValuationService {
    fn daily_value(&self, portfolio_id: &str, date: NaiveDate) -> Result<PortfolioDailyValue> {
        let (holdings, names) = self.load_holdings(portfolio_id)?;
        let asset_ids: Vec<String> = holdings.iter().map(|h| h.asset_id.clone()).collect();
        let prices = self.prices.prices_on_date(&asset_ids, date)?;
        debug!(
            "Valuing portfolio {} on {}: {} of {} holdings priced",
            portfolio_id,
            date,
            prices.len(),
            holdings.len()
        );
        value_on(date, &holdings, &names, &prices)
    }

    fn ranged_values(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PortfolioDailyValue>> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "Start date {} is after end date {}",
                start, end
            ))
            .into());
        }

        let (holdings, names) = self.load_holdings(portfolio_id)?;
        let asset_ids: Vec<String> = holdings.iter().map(|h| h.asset_id.clone()).collect();
        let prices = self.prices.prices_in_range(&asset_ids, start, end)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<Price>> = BTreeMap::new();
        for price in prices {
            by_date.entry(price.date).or_default().push(price);
        }

        by_date
            .into_iter()
            .map(|(date, prices)| value_on(date, &holdings, &names, &prices))
            .collect()
    }
}
