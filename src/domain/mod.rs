//! Domain types and the settlement calculator.
//!
//! Everything here is pure: lossless decimals, newtype primitives, position
//! and transaction records, and the sale settlement math. No I/O.

pub mod decimal;
pub mod position;
pub mod primitives;
pub mod settings;
pub mod settlement;
pub mod transaction;
pub mod user;

pub use decimal::Decimal;
pub use position::Position;
pub use primitives::{Market, Side, Symbol, TimeMs};
pub use settings::Settings;
pub use settlement::{settle, CommissionMode, CommissionSpec, SettlementError, SettlementResult};
pub use transaction::Transaction;
pub use user::{authorize, hash_password, Role, User};
