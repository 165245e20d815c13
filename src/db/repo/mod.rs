//! Repository layer for database operations.
//!
//! One `Repository` struct; methods are split across submodules by concern:
//! - `positions.rs` - portfolio holdings
//! - `transactions.rs` - trade history
//! - `settings.rs` - per-user settings
//! - `users.rs` - accounts

mod positions;
mod settings;
mod transactions;
mod users;

use crate::domain::Decimal;
use sqlx::sqlite::SqlitePool;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

/// Parse a decimal column, falling back to zero on a corrupt row rather
/// than failing the whole query.
fn parse_decimal_column(column: &str, raw: &str) -> Decimal {
    match Decimal::from_str_canonical(raw) {
        Ok(d) => d,
        Err(_) => {
            warn!("Corrupt decimal in column {}: {:?}", column, raw);
            Decimal::zero()
        }
    }
}
