//! Quote source abstraction.
//!
//! The service only ever talks to the [`QuoteSource`] trait; the shipped
//! implementation is a deterministic mock seeded with fixture prices. A
//! real market-data client would plug in at this seam.

use crate::domain::{Decimal, Market, Symbol};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::MockQuoteSource;

/// Current market data for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,
    pub name: String,
    pub price: Decimal,
    pub change_percent: Decimal,
}

/// Source of current quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync + fmt::Debug {
    /// Fetch the current quote for a symbol on a market.
    ///
    /// Returns `Ok(None)` when the symbol is unknown to the source.
    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        market: &Market,
    ) -> Result<Option<Quote>, QuoteError>;
}

/// Error type for quote operations.
#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    #[error("quote source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed quote data: {0}")]
    Parse(String),
}
