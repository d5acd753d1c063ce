use chrono::NaiveDate;

use super::assets_model::{Asset, AssetUpdate, AssetWithPrice, NewAsset};
use crate::errors::Result;
use crate::prices::{NewPrice, Price};

/// Trait defining the contract for Asset repository operations.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;

    /// Renames the asset. Returns `Error::NotFound` when it does not exist.
    async fn update(&self, asset_update: AssetUpdate) -> Result<Asset>;

    /// Returns `Error::NotFound` when the asset does not exist.
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;

    fn list(&self) -> Result<Vec<Asset>>;

    /// Assets matching the ids; unknown ids are skipped.
    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
}

/// Trait defining the contract for Asset service operations.
#[async_trait::async_trait]
pub trait AssetServiceTrait: Send + Sync {
    async fn create_asset(&self, new_asset: NewAsset) -> Result<Asset>;
    async fn update_asset(&self, asset_update: AssetUpdate) -> Result<Asset>;
    fn get_asset(&self, asset_id: &str) -> Result<Asset>;
    fn list_assets(&self) -> Result<Vec<Asset>>;
    /// The asset with its latest recorded price.
    fn get_asset_with_price(&self, asset_id: &str) -> Result<AssetWithPrice>;
    fn list_assets_with_price(&self) -> Result<Vec<AssetWithPrice>>;
    /// The price recorded for exactly `date`, if any.
    fn get_price_on_date(&self, asset_id: &str, date: NaiveDate) -> Result<Option<Price>>;
    async fn record_price(&self, new_price: NewPrice) -> Result<Price>;
    fn list_prices(&self, asset_id: &str) -> Result<Vec<Price>>;
}
