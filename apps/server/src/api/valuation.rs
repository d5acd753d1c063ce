use std::sync::Arc;

use crate::{
    api::shared::parse_date,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use abacus_core::valuation::PortfolioDailyValue;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct ValueQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
struct RangeQuery {
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

async fn get_daily_value(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<ValueQuery>,
) -> ApiResult<Json<PortfolioDailyValue>> {
    let date = q
        .date
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Missing date".to_string()))?;
    let date = parse_date(date, "date")?;
    let value = state.valuation_service.daily_value(&id, date)?;
    Ok(Json(value))
}

async fn get_ranged_values(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Json<Vec<PortfolioDailyValue>>> {
    let (Some(start), Some(end)) = (q.start_date.as_deref(), q.end_date.as_deref()) else {
        return Err(ApiError::BadRequest(
            "startDate and endDate are required".to_string(),
        ));
    };
    let start = parse_date(start, "startDate")?;
    let end = parse_date(end, "endDate")?;
    let values = state.valuation_service.ranged_values(&id, start, end)?;
    Ok(Json(values))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios/{id}/value", get(get_daily_value))
        .route("/portfolios/{id}/values", get(get_ranged_values))
}
