use crate::api::AppState;
use crate::domain::{CommissionSpec, Decimal, Market, Position, Symbol};
use crate::error::AppError;
use crate::portfolio::SellOutcome;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub symbol: String,
    pub market: Option<String>,
    pub quantity: i64,
    /// Execution price; defaults to the current quote when omitted.
    pub price: Option<Decimal>,
}

pub async fn post_buy(
    State(state): State<AppState>,
    Json(req): Json<BuyRequest>,
) -> Result<Json<Position>, AppError> {
    if req.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol must not be empty".into()));
    }
    if let Some(price) = req.price {
        if price.is_negative() {
            return Err(AppError::BadRequest("price must be >= 0".into()));
        }
    }

    let position = state
        .service
        .buy(
            Symbol::new(req.symbol),
            req.market.map(Market::new),
            req.quantity,
            req.price,
        )
        .await?;
    Ok(Json(position))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub symbol: String,
    pub quantity: i64,
    /// Sale price; defaults to the current quote when omitted.
    pub sale_price: Option<Decimal>,
    /// Whose settings supply default commission/tax terms.
    pub user_id: Option<String>,
    pub commission: Option<CommissionSpec>,
    pub tax_rate_percent: Option<Decimal>,
}

pub async fn post_sell(
    State(state): State<AppState>,
    Json(req): Json<SellRequest>,
) -> Result<Json<SellOutcome>, AppError> {
    if req.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol must not be empty".into()));
    }
    if let Some(price) = req.sale_price {
        if price.is_negative() {
            return Err(AppError::BadRequest("salePrice must be >= 0".into()));
        }
    }
    if let Some(tax) = req.tax_rate_percent {
        if tax.is_negative() {
            return Err(AppError::BadRequest("taxRatePercent must be >= 0".into()));
        }
    }
    if let Some(commission) = req.commission {
        if commission.value.is_negative() {
            return Err(AppError::BadRequest("commission value must be >= 0".into()));
        }
    }

    let outcome = state
        .service
        .sell(
            req.user_id.as_deref(),
            Symbol::new(req.symbol),
            req.quantity,
            req.sale_price,
            req.commission,
            req.tax_rate_percent,
        )
        .await?;
    Ok(Json(outcome))
}
