//! Portfolio position operations.

use crate::domain::{Market, Position, Symbol};
use sqlx::Row;

use super::{parse_decimal_column, Repository};

impl Repository {
    /// Fetch a single position by symbol.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_position(&self, symbol: &Symbol) -> Result<Option<Position>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT symbol, name, market, quantity, purchase_price
            FROM positions
            WHERE symbol = ?
            "#,
        )
        .bind(symbol.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_position))
    }

    /// List all positions, ordered by symbol for stable output.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_positions(&self) -> Result<Vec<Position>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, name, market, quantity, purchase_price
            FROM positions
            ORDER BY symbol ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_position).collect())
    }

    /// Insert a position only when no row for the symbol exists yet.
    /// Returns false when another writer created the row first.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn insert_position_if_absent(
        &self,
        position: &Position,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO positions
            (symbol, name, market, quantity, purchase_price)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(position.symbol.as_str())
        .bind(&position.name)
        .bind(position.market.as_str())
        .bind(position.quantity)
        .bind(position.purchase_price.to_canonical_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Update a position only if its stored quantity still equals
    /// `expected_quantity`. Returns false when a concurrent trade changed
    /// the row since it was read; the caller reloads and retries.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn update_position_if_quantity(
        &self,
        position: &Position,
        expected_quantity: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE positions
            SET name = ?, market = ?, quantity = ?, purchase_price = ?
            WHERE symbol = ? AND quantity = ?
            "#,
        )
        .bind(&position.name)
        .bind(position.market.as_str())
        .bind(position.quantity)
        .bind(position.purchase_price.to_canonical_string())
        .bind(position.symbol.as_str())
        .bind(expected_quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Reduce a position's quantity, deleting the row when it reaches zero.
    ///
    /// The decrement only applies while the row still holds at least
    /// `sold_quantity` shares, so a concurrent sale cannot drive the
    /// quantity negative. Returns the remaining quantity, or `None` when
    /// the guard failed and nothing was written.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn reduce_position(
        &self,
        symbol: &Symbol,
        sold_quantity: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE positions
            SET quantity = quantity - ?
            WHERE symbol = ? AND quantity >= ?
            RETURNING quantity
            "#,
        )
        .bind(sold_quantity)
        .bind(symbol.as_str())
        .bind(sold_quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let remaining = match row {
            Some(row) => row.get::<i64, _>("quantity"),
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        if remaining <= 0 {
            sqlx::query("DELETE FROM positions WHERE symbol = ?")
                .bind(symbol.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(remaining))
    }
}

fn row_to_position(row: sqlx::sqlite::SqliteRow) -> Position {
    let raw_price = row.get::<String, _>("purchase_price");
    Position {
        symbol: Symbol::new(row.get::<String, _>("symbol")),
        name: row.get::<String, _>("name"),
        market: Market::new(row.get::<String, _>("market")),
        quantity: row.get::<i64, _>("quantity"),
        purchase_price: parse_decimal_column("purchase_price", &raw_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::Decimal;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn position(symbol: &str, quantity: i64, price: &str) -> Position {
        Position {
            symbol: Symbol::new(symbol),
            name: format!("{} Inc.", symbol),
            market: Market::new("NASDAQ"),
            quantity,
            purchase_price: Decimal::from_str_canonical(price).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_position() {
        let (repo, _temp) = repo().await;
        let p = position("AAPL", 10, "150.5");

        assert!(repo.insert_position_if_absent(&p).await.unwrap());
        let fetched = repo.get_position(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(fetched, Some(p));
    }

    #[tokio::test]
    async fn test_insert_if_absent_refuses_existing_row() {
        let (repo, _temp) = repo().await;
        let p = position("AAPL", 10, "150");
        assert!(repo.insert_position_if_absent(&p).await.unwrap());

        let other = position("AAPL", 99, "1");
        assert!(!repo.insert_position_if_absent(&other).await.unwrap());

        let fetched = repo.get_position(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(fetched, Some(p));
    }

    #[tokio::test]
    async fn test_get_missing_position_is_none() {
        let (repo, _temp) = repo().await;
        assert_eq!(repo.get_position(&Symbol::new("ZZZZ")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_positions_ordered_by_symbol() {
        let (repo, _temp) = repo().await;
        repo.insert_position_if_absent(&position("MSFT", 5, "300")).await.unwrap();
        repo.insert_position_if_absent(&position("AAPL", 10, "150")).await.unwrap();

        let positions = repo.list_positions().await.unwrap();
        let symbols: Vec<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_update_if_quantity_applies_on_match() {
        let (repo, _temp) = repo().await;
        repo.insert_position_if_absent(&position("AAPL", 10, "100")).await.unwrap();

        let merged = position("AAPL", 20, "150");
        assert!(repo.update_position_if_quantity(&merged, 10).await.unwrap());
        let fetched = repo.get_position(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(fetched, Some(merged));
    }

    #[tokio::test]
    async fn test_update_if_quantity_refuses_stale_expectation() {
        let (repo, _temp) = repo().await;
        let original = position("AAPL", 10, "100");
        repo.insert_position_if_absent(&original).await.unwrap();

        let merged = position("AAPL", 20, "150");
        assert!(!repo.update_position_if_quantity(&merged, 7).await.unwrap());
        let fetched = repo.get_position(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(fetched, Some(original));
    }

    #[tokio::test]
    async fn test_reduce_position_partial() {
        let (repo, _temp) = repo().await;
        repo.insert_position_if_absent(&position("AAPL", 10, "150")).await.unwrap();

        let remaining = repo.reduce_position(&Symbol::new("AAPL"), 4).await.unwrap();
        assert_eq!(remaining, Some(6));
        let p = repo.get_position(&Symbol::new("AAPL")).await.unwrap().unwrap();
        assert_eq!(p.quantity, 6);
    }

    #[tokio::test]
    async fn test_reduce_position_to_zero_deletes_row() {
        let (repo, _temp) = repo().await;
        repo.insert_position_if_absent(&position("AAPL", 10, "150")).await.unwrap();

        let remaining = repo.reduce_position(&Symbol::new("AAPL"), 10).await.unwrap();
        assert_eq!(remaining, Some(0));
        assert_eq!(repo.get_position(&Symbol::new("AAPL")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reduce_beyond_held_refused_and_row_untouched() {
        let (repo, _temp) = repo().await;
        repo.insert_position_if_absent(&position("AAPL", 10, "150")).await.unwrap();

        let remaining = repo.reduce_position(&Symbol::new("AAPL"), 11).await.unwrap();
        assert_eq!(remaining, None);
        let p = repo.get_position(&Symbol::new("AAPL")).await.unwrap().unwrap();
        assert_eq!(p.quantity, 10);
    }

    #[tokio::test]
    async fn test_reduce_missing_position_refused() {
        let (repo, _temp) = repo().await;
        let remaining = repo.reduce_position(&Symbol::new("ZZZZ"), 1).await.unwrap();
        assert_eq!(remaining, None);
    }
}
