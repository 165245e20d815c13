//! Trade history operations.

use crate::domain::{Side, Symbol, TimeMs, Transaction};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use super::{parse_decimal_column, Repository};

impl Repository {
    /// Append a transaction to the history.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_transaction(&self, tx: &Transaction) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO transactions
            (id, time_ms, symbol, side, quantity, price, commission_amount, net_amount)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(tx.time_ms.as_i64())
        .bind(tx.symbol.as_str())
        .bind(tx.side.as_str())
        .bind(tx.quantity)
        .bind(tx.price.to_canonical_string())
        .bind(tx.commission_amount.to_canonical_string())
        .bind(tx.net_amount.to_canonical_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Query history with optional symbol and time window, oldest first.
    /// Ties on time break by id so ordering stays stable.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_transactions(
        &self,
        symbol: Option<&Symbol>,
        from_ms: Option<TimeMs>,
        to_ms: Option<TimeMs>,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let from_ms = from_ms.unwrap_or(TimeMs::new(0)).as_i64();
        let to_ms = to_ms.unwrap_or(TimeMs::new(i64::MAX)).as_i64();

        let sql = if symbol.is_some() {
            r#"
            SELECT id, time_ms, symbol, side, quantity, price, commission_amount, net_amount
            FROM transactions
            WHERE symbol = ? AND time_ms >= ? AND time_ms <= ?
            ORDER BY time_ms ASC, id ASC
            "#
        } else {
            r#"
            SELECT id, time_ms, symbol, side, quantity, price, commission_amount, net_amount
            FROM transactions
            WHERE time_ms >= ? AND time_ms <= ?
            ORDER BY time_ms ASC, id ASC
            "#
        };

        let mut query = sqlx::query(sql);
        if let Some(symbol) = symbol {
            query = query.bind(symbol.as_str());
        }
        let query = query.bind(from_ms).bind(to_ms);

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(row_to_transaction).collect())
    }
}

fn row_to_transaction(row: sqlx::sqlite::SqliteRow) -> Transaction {
    let raw_id = row.get::<String, _>("id");
    let raw_side = row.get::<String, _>("side");
    let raw_price = row.get::<String, _>("price");
    let raw_commission = row.get::<String, _>("commission_amount");
    let raw_net = row.get::<String, _>("net_amount");

    Transaction {
        id: Uuid::from_str(&raw_id).unwrap_or_else(|_| {
            warn!("Corrupt id in transactions row: {:?}", raw_id);
            Uuid::nil()
        }),
        time_ms: TimeMs::new(row.get::<i64, _>("time_ms")),
        symbol: Symbol::new(row.get::<String, _>("symbol")),
        side: Side::from_str(&raw_side).unwrap_or_else(|_| {
            warn!("Corrupt side in transactions row: {:?}", raw_side);
            Side::Buy
        }),
        quantity: row.get::<i64, _>("quantity"),
        price: parse_decimal_column("price", &raw_price),
        commission_amount: parse_decimal_column("commission_amount", &raw_commission),
        net_amount: parse_decimal_column("net_amount", &raw_net),
    }
}
