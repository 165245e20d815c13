//! Portfolio position: a held quantity of a symbol at a recorded purchase price.

use crate::domain::{Decimal, Market, Symbol};
use serde::{Deserialize, Serialize};

/// A holding in the portfolio. Created on buy, reduced or removed on sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: Symbol,
    pub name: String,
    pub market: Market,
    /// Shares held; always > 0 while the row exists.
    pub quantity: i64,
    /// Average price paid per share.
    pub purchase_price: Decimal,
}

impl Position {
    /// Total cost basis of the holding.
    pub fn cost_basis(&self) -> Decimal {
        self.purchase_price * Decimal::from_i64(self.quantity)
    }

    /// Merge an additional purchase into this position, recomputing the
    /// weighted-average purchase price.
    pub fn merge_buy(&mut self, quantity: i64, price: Decimal) {
        let old_cost = self.cost_basis();
        let added_cost = price * Decimal::from_i64(quantity);
        self.quantity += quantity;
        self.purchase_price = (old_cost + added_cost) / Decimal::from_i64(self.quantity);
    }
}
