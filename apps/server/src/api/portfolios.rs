use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use abacus_core::portfolios::{NewPortfolio, Portfolio, PortfolioUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

async fn list_portfolios(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Portfolio>>> {
    let portfolios = state.portfolio_service.list_portfolios()?;
    Ok(Json(portfolios))
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    Json(portfolio): Json<NewPortfolio>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let created = state.portfolio_service.create_portfolio(portfolio).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state.portfolio_service.get_portfolio(&id)?;
    Ok(Json(portfolio))
}

async fn update_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PortfolioUpdate>,
) -> ApiResult<Json<Portfolio>> {
    let update = PortfolioUpdate {
        id: Some(id),
        ..update
    };
    let updated = state.portfolio_service.update_portfolio(update).await?;
    Ok(Json(updated))
}

async fn delete_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.portfolio_service.delete_portfolio(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios).post(create_portfolio))
        .route(
            "/portfolios/{id}",
            get(get_portfolio)
                .put(update_portfolio)
                .delete(delete_portfolio),
        )
}
