pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod portfolio;
pub mod quotes;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    settle, CommissionMode, CommissionSpec, Decimal, Market, Position, Settings, SettlementError,
    SettlementResult, Side, Symbol, TimeMs, Transaction,
};
pub use error::AppError;
pub use portfolio::PortfolioService;
pub use quotes::{MockQuoteSource, Quote, QuoteError, QuoteSource};
