//! Deposits, transactions, holdings and target weights.

use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use abacus_core::{
    holdings::Holding,
    ledger::{
        Deposit, DepositReceipt, DepositRequest, Transaction, TransactionReceipt,
        TransactionRequest, WeightAssignment,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

async fn list_holdings(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Holding>>> {
    let holdings = state.ledger_service.list_holdings(&id)?;
    Ok(Json(holdings))
}

async fn set_target_weights(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(weights): Json<Vec<WeightAssignment>>,
) -> ApiResult<Json<Vec<Holding>>> {
    let holdings = state.ledger_service.set_target_weights(&id, weights).await?;
    Ok(Json(holdings))
}

async fn create_deposit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DepositRequest>,
) -> ApiResult<(StatusCode, Json<DepositReceipt>)> {
    let receipt = state.ledger_service.create_deposit(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_deposits(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Deposit>>> {
    let deposits = state.ledger_service.list_deposits(&id)?;
    Ok(Json(deposits))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionReceipt>)> {
    let receipt = state.ledger_service.create_transaction(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_transactions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state.ledger_service.list_transactions(&id)?;
    Ok(Json(transactions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios/{id}/holdings", get(list_holdings))
        .route("/portfolios/{id}/weights", put(set_target_weights))
        .route("/portfolios/{id}/deposits", get(list_deposits))
        .route("/portfolios/{id}/transactions", get(list_transactions))
        .route("/deposits", post(create_deposit))
        .route("/transactions", post(create_transaction))
}
