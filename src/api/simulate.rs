use crate::api::AppState;
use crate::domain::{CommissionSpec, Decimal, SettlementResult};
use crate::error::AppError;
use crate::portfolio::SimulationInput;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: i64,
    /// Whose settings supply default commission/tax terms.
    pub user_id: Option<String>,
    pub commission: Option<CommissionSpec>,
    pub tax_rate_percent: Option<Decimal>,
    /// The "calculate tax" toggle; defaults to on.
    pub include_tax: Option<bool>,
}

pub async fn post_simulate(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SettlementResult>, AppError> {
    if req.purchase_price.is_negative() || req.sale_price.is_negative() {
        return Err(AppError::BadRequest("prices must be >= 0".into()));
    }
    if let Some(commission) = req.commission {
        if commission.value.is_negative() {
            return Err(AppError::BadRequest("commission value must be >= 0".into()));
        }
    }
    if let Some(tax) = req.tax_rate_percent {
        if tax.is_negative() {
            return Err(AppError::BadRequest("taxRatePercent must be >= 0".into()));
        }
    }

    let (commission, tax_rate_percent) = state
        .service
        .trade_terms(req.user_id.as_deref(), req.commission, req.tax_rate_percent)
        .await?;

    let result = state.service.simulate(&SimulationInput {
        purchase_price: req.purchase_price,
        sale_price: req.sale_price,
        quantity: req.quantity,
        commission,
        tax_rate_percent,
        include_tax: req.include_tax.unwrap_or(true),
    })?;
    Ok(Json(result))
}
