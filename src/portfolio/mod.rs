//! Portfolio service: buy/sell execution, simulation, and valuation.
//!
//! Orchestrates the repository, the quote source, and the settlement
//! calculator. All financial math happens in `domain::settlement`; this
//! layer owns the ledger side effects around it.

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{
    settle, CommissionSpec, Decimal, Market, Position, SettlementError, SettlementResult, Symbol,
    Transaction,
};
use crate::quotes::{QuoteError, QuoteSource};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("no position held in {0}")]
    PositionNotFound(Symbol),
    #[error("no quote available for {0} and no price supplied")]
    UnknownSymbol(Symbol),
    #[error("invalid buy quantity {0}: must be >= 1")]
    InvalidBuyQuantity(i64),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Inputs to a what-if settlement. Mirrors the sale path without touching
/// the ledger.
#[derive(Debug, Clone)]
pub struct SimulationInput {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: i64,
    pub commission: CommissionSpec,
    pub tax_rate_percent: Decimal,
    /// When false, tax is skipped entirely (the dialog's "calculate tax"
    /// toggle in the off position).
    pub include_tax: bool,
}

/// Result of an executed sell: the settlement plus what's left of the
/// position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellOutcome {
    pub settlement: SettlementResult,
    pub remaining_quantity: i64,
}

/// One position joined with its current quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub symbol: Symbol,
    pub name: String,
    pub market: Market,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub current_price: Decimal,
    pub change_percent: Decimal,
    pub cost_basis: Decimal,
    pub market_value: Decimal,
    pub unrealized_profit_loss: Decimal,
    pub unrealized_profit_loss_percent: Decimal,
}

/// Whole-portfolio snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub positions: Vec<PositionValuation>,
    pub total_cost_basis: Decimal,
    pub total_market_value: Decimal,
    pub total_unrealized_profit_loss: Decimal,
}

pub struct PortfolioService {
    repo: Arc<Repository>,
    quotes: Arc<dyn QuoteSource>,
    config: Config,
}

impl PortfolioService {
    pub fn new(repo: Arc<Repository>, quotes: Arc<dyn QuoteSource>, config: Config) -> Self {
        PortfolioService {
            repo,
            quotes,
            config,
        }
    }

    /// Resolve commission and tax for a trade: request override first, then
    /// the user's stored settings, then server defaults.
    pub async fn trade_terms(
        &self,
        user_id: Option<&str>,
        commission_override: Option<CommissionSpec>,
        tax_override: Option<Decimal>,
    ) -> Result<(CommissionSpec, Decimal), TradeError> {
        if let (Some(commission), Some(tax)) = (commission_override, tax_override) {
            return Ok((commission, tax));
        }

        let (settings_commission, settings_tax) = match user_id {
            Some(user_id) => {
                let settings = self.repo.get_settings(user_id).await?;
                (settings.commission(), settings.tax_rate_percent)
            }
            None => (self.config.commission(), self.config.tax_rate_percent),
        };

        Ok((
            commission_override.unwrap_or(settings_commission),
            tax_override.unwrap_or(settings_tax),
        ))
    }

    /// Execute a buy: create the position or merge into an existing one at
    /// the weighted-average purchase price, and record the transaction.
    ///
    /// # Errors
    /// `InvalidQuantity` for quantity < 1; `UnknownSymbol` when no price is
    /// supplied and the quote source has never heard of the symbol.
    pub async fn buy(
        &self,
        symbol: Symbol,
        market: Option<Market>,
        quantity: i64,
        price: Option<Decimal>,
    ) -> Result<Position, TradeError> {
        if quantity < 1 {
            return Err(TradeError::InvalidBuyQuantity(quantity));
        }

        let market = market.unwrap_or_else(|| Market::new(self.config.default_market.clone()));
        let quote = self.quotes.fetch_quote(&symbol, &market).await?;

        let price = match (price, &quote) {
            (Some(price), _) => price,
            (None, Some(quote)) => quote.price,
            (None, None) => return Err(TradeError::UnknownSymbol(symbol)),
        };
        let name = quote.map(|q| q.name).unwrap_or_default();

        // Merge-and-write must not clobber a concurrent trade on the same
        // symbol, so each write is conditional on the quantity it merged
        // from; on a miss we reload and merge again.
        let position = loop {
            match self.repo.get_position(&symbol).await? {
                Some(mut existing) => {
                    let held_before = existing.quantity;
                    existing.merge_buy(quantity, price);
                    if self
                        .repo
                        .update_position_if_quantity(&existing, held_before)
                        .await?
                    {
                        break existing;
                    }
                }
                None => {
                    let fresh = Position {
                        symbol: symbol.clone(),
                        name: name.clone(),
                        market: market.clone(),
                        quantity,
                        purchase_price: price,
                    };
                    if self.repo.insert_position_if_absent(&fresh).await? {
                        break fresh;
                    }
                }
            }
        };

        self.repo
            .insert_transaction(&Transaction::buy(symbol.clone(), quantity, price))
            .await?;

        info!("Bought {} x {} @ {}", quantity, symbol, price);
        Ok(position)
    }

    /// Execute a sell: settle, shrink or remove the position, and record
    /// the transaction with net proceeds.
    ///
    /// # Errors
    /// `PositionNotFound` when nothing is held; `InvalidQuantity` unless
    /// `1 <= quantity <= held`.
    pub async fn sell(
        &self,
        user_id: Option<&str>,
        symbol: Symbol,
        quantity: i64,
        sale_price: Option<Decimal>,
        commission_override: Option<CommissionSpec>,
        tax_override: Option<Decimal>,
    ) -> Result<SellOutcome, TradeError> {
        let position = self
            .repo
            .get_position(&symbol)
            .await?
            .ok_or_else(|| TradeError::PositionNotFound(symbol.clone()))?;

        let sale_price = match sale_price {
            Some(price) => price,
            None => {
                let quote = self.quotes.fetch_quote(&symbol, &position.market).await?;
                quote
                    .map(|q| q.price)
                    .ok_or_else(|| TradeError::UnknownSymbol(symbol.clone()))?
            }
        };

        let (commission, tax_rate_percent) = self
            .trade_terms(user_id, commission_override, tax_override)
            .await?;

        let settlement = settle(
            position.quantity,
            position.purchase_price,
            sale_price,
            quantity,
            commission,
            tax_rate_percent,
        )?;

        // The conditional decrement is the authoritative quantity check:
        // a concurrent sale can shrink the position between the read above
        // and this write, and then nothing must be recorded.
        let remaining = match self.repo.reduce_position(&symbol, quantity).await? {
            Some(remaining) => remaining,
            None => {
                let held = self
                    .repo
                    .get_position(&symbol)
                    .await?
                    .map(|p| p.quantity)
                    .unwrap_or(0);
                return Err(TradeError::Settlement(SettlementError::InvalidQuantity {
                    requested: quantity,
                    held,
                }));
            }
        };

        // Cash into the account: gross revenue minus commission and tax.
        let net_proceeds = settlement.total_sale_revenue
            - settlement.commission_amount
            - settlement.tax_amount;
        self.repo
            .insert_transaction(&Transaction::sell(
                symbol.clone(),
                quantity,
                sale_price,
                settlement.commission_amount,
                net_proceeds,
            ))
            .await?;

        info!(
            "Sold {} x {} @ {} (net P/L {})",
            quantity, symbol, sale_price, settlement.net_profit_loss
        );
        Ok(SellOutcome {
            settlement,
            remaining_quantity: remaining,
        })
    }

    /// Run a what-if settlement. Never touches the ledger.
    pub fn simulate(&self, input: &SimulationInput) -> Result<SettlementResult, TradeError> {
        let tax_rate = if input.include_tax {
            input.tax_rate_percent
        } else {
            Decimal::zero()
        };

        // The simulated position is exactly the simulated sale.
        Ok(settle(
            input.quantity,
            input.purchase_price,
            input.sale_price,
            input.quantity,
            input.commission,
            tax_rate,
        )?)
    }

    /// Join every position with its current quote.
    ///
    /// Symbols the quote source doesn't know are valued at their purchase
    /// price with zero movement, so the portfolio never loses rows.
    pub async fn valuation(&self) -> Result<PortfolioValuation, TradeError> {
        let positions = self.repo.list_positions().await?;

        let mut valued = Vec::with_capacity(positions.len());
        let mut total_cost_basis = Decimal::zero();
        let mut total_market_value = Decimal::zero();

        for position in positions {
            let quote = self
                .quotes
                .fetch_quote(&position.symbol, &position.market)
                .await?;
            let (current_price, change_percent) = match &quote {
                Some(q) => (q.price, q.change_percent),
                None => (position.purchase_price, Decimal::zero()),
            };

            let cost_basis = position.cost_basis();
            let market_value = current_price * Decimal::from_i64(position.quantity);
            let unrealized = market_value - cost_basis;
            let unrealized_percent = if cost_basis.is_zero() {
                Decimal::zero()
            } else {
                unrealized / cost_basis * Decimal::hundred()
            };

            total_cost_basis = total_cost_basis + cost_basis;
            total_market_value = total_market_value + market_value;

            valued.push(PositionValuation {
                symbol: position.symbol,
                name: position.name,
                market: position.market,
                quantity: position.quantity,
                purchase_price: position.purchase_price,
                current_price,
                change_percent,
                cost_basis,
                market_value,
                unrealized_profit_loss: unrealized,
                unrealized_profit_loss_percent: unrealized_percent,
            });
        }

        Ok(PortfolioValuation {
            total_unrealized_profit_loss: total_market_value - total_cost_basis,
            total_cost_basis,
            total_market_value,
            positions: valued,
        })
    }

    /// Positions ranked by unrealized profit, best first.
    pub async fn top_performers(&self, limit: usize) -> Result<Vec<PositionValuation>, TradeError> {
        let mut positions = self.valuation().await?.positions;
        positions.sort_by(|a, b| {
            b.unrealized_profit_loss
                .cmp(&a.unrealized_profit_loss)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        positions.truncate(limit);
        Ok(positions)
    }
}
