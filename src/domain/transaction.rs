//! Executed trade record for the transaction history ledger.

use crate::domain::{Decimal, Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One executed buy or sell.
///
/// `net_amount` is signed from the account's point of view: negative cash
/// out on a buy, net proceeds in on a sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub time_ms: TimeMs,
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: i64,
    /// Execution price per share.
    pub price: Decimal,
    pub commission_amount: Decimal,
    pub net_amount: Decimal,
}

impl Transaction {
    pub fn buy(symbol: Symbol, quantity: i64, price: Decimal) -> Self {
        let notional = price * Decimal::from_i64(quantity);
        Transaction {
            id: Uuid::new_v4(),
            time_ms: TimeMs::now(),
            symbol,
            side: Side::Buy,
            quantity,
            price,
            commission_amount: Decimal::zero(),
            net_amount: -notional,
        }
    }

    pub fn sell(
        symbol: Symbol,
        quantity: i64,
        price: Decimal,
        commission_amount: Decimal,
        net_proceeds: Decimal,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            time_ms: TimeMs::now(),
            symbol,
            side: Side::Sell,
            quantity,
            price,
            commission_amount,
            net_amount: net_proceeds,
        }
    }
}
