use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::assets_model::{Asset, AssetUpdate, AssetWithPrice, NewAsset};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::errors::Result;
use crate::prices::{NewPrice, Price, PriceRepositoryTrait};

/// Service for assets and their price history.
pub struct AssetService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl AssetService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            asset_repository,
            price_repository,
        }
    }

    fn with_price(&self, asset: Asset) -> Result<AssetWithPrice> {
        let price = self.price_repository.latest_price(&asset.id)?;
        Ok(AssetWithPrice { asset, price })
    }
}

#[async_trait::async_trait]
impl AssetServiceTrait for AssetService {
    async fn create_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let new_asset = NewAsset {
            name: new_asset.name.trim().to_string(),
            ..new_asset
        };
        self.asset_repository.create(new_asset).await
    }

    async fn update_asset(&self, asset_update: AssetUpdate) -> Result<Asset> {
        asset_update.validate()?;
        let asset_update = AssetUpdate {
            name: asset_update.name.trim().to_string(),
            ..asset_update
        };
        self.asset_repository.update(asset_update).await
    }

    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_by_id(asset_id)
    }

    fn list_assets(&self) -> Result<Vec<Asset>> {
        self.asset_repository.list()
    }

    fn get_asset_with_price(&self, asset_id: &str) -> Result<AssetWithPrice> {
        let asset = self.asset_repository.get_by_id(asset_id)?;
        self.with_price(asset)
    }

    fn list_assets_with_price(&self) -> Result<Vec<AssetWithPrice>> {
        self.asset_repository
            .list()?
            .into_iter()
            .map(|asset| self.with_price(asset))
            .collect()
    }

    fn get_price_on_date(&self, asset_id: &str, date: NaiveDate) -> Result<Option<Price>> {
        self.asset_repository.get_by_id(asset_id)?;
        self.price_repository.price_on_date(asset_id, date)
    }

    async fn record_price(&self, new_price: NewPrice) -> Result<Price> {
        new_price.validate()?;
        self.asset_repository.get_by_id(&new_price.asset_id)?;
        debug!(
            "Recording price {} for asset {} on {}",
            new_price.price, new_price.asset_id, new_price.date
        );
        self.price_repository.upsert_price(new_price).await
    }

    fn list_prices(&self, asset_id: &str) -> Result<Vec<Price>> {
        self.asset_repository.get_by_id(asset_id)?;
        self.price_repository.list_prices_for_asset(asset_id)
    }
}
