use chrono::NaiveDate;

use super::valuation_model::PortfolioDailyValue;
use crate::errors::Result;

pub trait ValuationServiceTrait: Send + Sync {
    fn daily_value(&self, portfolio_id: &str, date: NaiveDate) -> Result<PortfolioDailyValue>;

    /// One entry per date in `[start, end]` on which at least one of the
    /// portfolio's assets has a price, ordered by date ascending.
    fn ranged_values(
        &self,
        portfolio_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PortfolioDailyValue>>;
}
