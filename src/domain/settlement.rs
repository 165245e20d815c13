//! Trade settlement calculator.
//!
//! Computes the financial outcome of closing some or all of a position:
//! commission, gross profit/loss, tax withheld, and net proceeds. Pure
//! arithmetic over [`Decimal`]; no I/O, no state.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the broker commission is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionMode {
    /// Flat currency amount, independent of trade size.
    Fixed,
    /// Percentage applied to the sum of purchase and sale price.
    Percentage,
}

impl std::str::FromStr for CommissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(CommissionMode::Fixed),
            "percentage" => Ok(CommissionMode::Percentage),
            other => Err(format!("unknown commission mode: {}", other)),
        }
    }
}

impl std::fmt::Display for CommissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommissionMode::Fixed => write!(f, "fixed"),
            CommissionMode::Percentage => write!(f, "percentage"),
        }
    }
}

/// Commission configuration: mode plus its value (currency amount for
/// `Fixed`, percent for `Percentage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSpec {
    pub mode: CommissionMode,
    pub value: Decimal,
}

impl CommissionSpec {
    pub fn fixed(value: Decimal) -> Self {
        CommissionSpec {
            mode: CommissionMode::Fixed,
            value,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        CommissionSpec {
            mode: CommissionMode::Percentage,
            value,
        }
    }
}

/// Outcome of settling a sale. Immutable value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    pub total_purchase_cost: Decimal,
    pub total_sale_revenue: Decimal,
    pub commission_amount: Decimal,
    pub gross_profit_loss: Decimal,
    pub tax_amount: Decimal,
    pub net_profit_loss: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Sale quantity outside `1..=held quantity`.
    #[error("invalid sale quantity {requested}: must be between 1 and {held}")]
    InvalidQuantity { requested: i64, held: i64 },
}

/// Settle the sale of `sale_quantity` shares held at `purchase_price`.
///
/// Percentage commissions are charged on `purchase_price + sale_price`, the
/// per-share price sum, not on traded notional. That matches the historical
/// behavior this ledger replicates; see DESIGN.md before changing it.
///
/// Tax is withheld only on positive gross profit, at `tax_rate_percent`.
/// Losses carry no tax relief.
///
/// # Errors
/// Returns [`SettlementError::InvalidQuantity`] unless
/// `1 <= sale_quantity <= position_quantity`.
pub fn settle(
    position_quantity: i64,
    purchase_price: Decimal,
    sale_price: Decimal,
    sale_quantity: i64,
    commission: CommissionSpec,
    tax_rate_percent: Decimal,
) -> Result<SettlementResult, SettlementError> {
    if sale_quantity < 1 || sale_quantity > position_quantity {
        return Err(SettlementError::InvalidQuantity {
            requested: sale_quantity,
            held: position_quantity,
        });
    }

    let qty = Decimal::from_i64(sale_quantity);
    let total_purchase_cost = purchase_price * qty;
    let total_sale_revenue = sale_price * qty;

    let commission_amount = match commission.mode {
        CommissionMode::Fixed => commission.value,
        CommissionMode::Percentage => {
            (purchase_price + sale_price) * commission.value / Decimal::hundred()
        }
    };

    let gross_profit_loss = total_sale_revenue - total_purchase_cost - commission_amount;
    let tax_amount = if gross_profit_loss.is_positive() {
        gross_profit_loss * tax_rate_percent / Decimal::hundred()
    } else {
        Decimal::zero()
    };
    let net_profit_loss = gross_profit_loss - tax_amount;

    Ok(SettlementResult {
        total_purchase_cost,
        total_sale_revenue,
        commission_amount,
        gross_profit_loss,
        tax_amount,
        net_profit_loss,
    })
}
