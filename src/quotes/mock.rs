//! Deterministic in-memory quote source.

use crate::domain::{Decimal, Market, Symbol};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Quote, QuoteError, QuoteSource};

/// Quote source backed by a fixture table. Prices never move on their own,
/// which keeps valuations and tests reproducible.
#[derive(Debug)]
pub struct MockQuoteSource {
    quotes: Mutex<HashMap<Symbol, Quote>>,
}

const FIXTURES: &[(&str, &str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "175.50", "1.2"),
    ("MSFT", "Microsoft Corporation", "410.20", "0.8"),
    ("GOOGL", "Alphabet Inc.", "142.65", "-0.4"),
    ("AMZN", "Amazon.com Inc.", "178.15", "2.1"),
    ("TSLA", "Tesla Inc.", "248.42", "-1.7"),
    ("NVDA", "NVIDIA Corporation", "495.22", "3.4"),
    ("ENI", "Eni S.p.A.", "14.86", "0.3"),
    ("ISP", "Intesa Sanpaolo", "3.52", "-0.2"),
];

impl MockQuoteSource {
    pub fn new() -> Self {
        let quotes = FIXTURES
            .iter()
            .map(|(symbol, name, price, change)| {
                let symbol = Symbol::new(*symbol);
                (
                    symbol.clone(),
                    Quote {
                        symbol,
                        name: (*name).to_string(),
                        price: Decimal::from_str_canonical(price)
                            .expect("fixture price must parse"),
                        change_percent: Decimal::from_str_canonical(change)
                            .expect("fixture change must parse"),
                    },
                )
            })
            .collect();

        MockQuoteSource {
            quotes: Mutex::new(quotes),
        }
    }

    /// Insert or replace a quote. Used by tests to pin prices.
    pub fn set_quote(&self, quote: Quote) {
        self.quotes
            .lock()
            .expect("quote map lock poisoned")
            .insert(quote.symbol.clone(), quote);
    }
}

impl Default for MockQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        _market: &Market,
    ) -> Result<Option<Quote>, QuoteError> {
        Ok(self
            .quotes
            .lock()
            .expect("quote map lock poisoned")
            .get(symbol)
            .cloned())
    }
}
