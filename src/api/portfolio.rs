use crate::api::AppState;
use crate::error::AppError;
use crate::portfolio::{PortfolioValuation, PositionValuation};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

pub async fn get_portfolio(
    State(state): State<AppState>,
) -> Result<Json<PortfolioValuation>, AppError> {
    let valuation = state.service.valuation().await?;
    Ok(Json(valuation))
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformersResponse {
    pub positions: Vec<PositionValuation>,
}

pub async fn get_top_performers(
    Query(params): Query<TopQuery>,
    State(state): State<AppState>,
) -> Result<Json<TopPerformersResponse>, AppError> {
    let limit = params.limit.unwrap_or(5);
    if limit == 0 {
        return Err(AppError::BadRequest("limit must be >= 1".into()));
    }

    let positions = state.service.top_performers(limit).await?;
    Ok(Json(TopPerformersResponse { positions }))
}
