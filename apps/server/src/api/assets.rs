use std::sync::Arc;

use crate::{
    api::shared::parse_date,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use abacus_core::{
    assets::{Asset, AssetUpdate, AssetWithPrice, NewAsset},
    prices::{NewPrice, Price},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceInput {
    date: NaiveDate,
    price: Decimal,
}

async fn list_assets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AssetWithPrice>>> {
    let assets = state.asset_service.list_assets_with_price()?;
    Ok(Json(assets))
}

async fn create_asset(
    State(state): State<Arc<AppState>>,
    Json(asset): Json<NewAsset>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let created = state.asset_service.create_asset(asset).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AssetWithPrice>> {
    let asset = state.asset_service.get_asset_with_price(&id)?;
    Ok(Json(asset))
}

async fn update_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(mut asset): Json<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    asset.id = Some(id);
    let updated = state.asset_service.update_asset(asset).await?;
    Ok(Json(updated))
}

async fn list_prices(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Price>>> {
    let prices = state.asset_service.list_prices(&id)?;
    Ok(Json(prices))
}

async fn record_price(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<PriceInput>,
) -> ApiResult<Json<Price>> {
    let price = state
        .asset_service
        .record_price(NewPrice {
            asset_id: id,
            date: input.date,
            price: input.price,
        })
        .await?;
    Ok(Json(price))
}

async fn get_price_on_date(
    Path((id, date)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Price>> {
    let date = parse_date(&date, "date")?;
    state
        .asset_service
        .get_price_on_date(&id, date)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", get(get_asset).put(update_asset))
        .route("/assets/{id}/prices", get(list_prices).post(record_price))
        .route("/assets/{id}/prices/{date}", get(get_price_on_date))
}
