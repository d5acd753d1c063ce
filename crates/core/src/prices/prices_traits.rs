use async_trait::async_trait;
use chrono::NaiveDate;

use super::prices_model::{NewPrice, Price};
use crate::errors::Result;

/// Read-only price lookups.
///
/// Lookups are exact: a date without a recorded price yields `None`, never an
/// interpolated or carried-forward value.
pub trait PriceIndex: Send + Sync {
    /// The price with the greatest date for the asset.
    fn latest_price(&self, asset_id: &str) -> Result<Option<Price>>;

    /// The price recorded for exactly `date`.
    fn price_on_date(&self, asset_id: &str, date: NaiveDate) -> Result<Option<Price>>;

    /// All prices recorded on `date` for the given assets. Assets without a
    /// price that day are omitted.
    fn prices_on_date(&self, asset_ids: &[String], date: NaiveDate) -> Result<Vec<Price>>;

    /// All prices for the given assets with `start <= date <= end`, ordered by
    /// date ascending.
    fn prices_in_range(
        &self,
        asset_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Price>>;
}

#[async_trait]
pub trait PriceRepositoryTrait: PriceIndex {
    /// Inserts the price or replaces the one already stored for (asset, date).
    async fn upsert_price(&self, new_price: NewPrice) -> Result<Price>;

    /// All prices of an asset ordered by date ascending.
    fn list_prices_for_asset(&self, asset_id: &str) -> Result<Vec<Price>>;
}
