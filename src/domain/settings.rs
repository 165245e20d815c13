//! Per-user display and trading settings.
//!
//! Settlement never reads these from ambient state; callers resolve a
//! `Settings` and pass the relevant pieces in explicitly.

use crate::domain::{CommissionMode, CommissionSpec, Decimal};
use serde::{Deserialize, Serialize};

/// User preferences: display options plus default commission/tax assumptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub currency: String,
    pub market: String,
    pub theme: String,
    pub commission_mode: CommissionMode,
    pub commission_value: Decimal,
    pub tax_rate_percent: Decimal,
    pub language: String,
    pub nationality: String,
}

impl Settings {
    pub fn commission(&self) -> CommissionSpec {
        CommissionSpec {
            mode: self.commission_mode,
            value: self.commission_value,
        }
    }
}

impl Default for Settings {
    /// Defaults served to users with no stored settings row.
    fn default() -> Self {
        Settings {
            currency: "EUR".to_string(),
            market: "NYSE".to_string(),
            theme: "light".to_string(),
            commission_mode: CommissionMode::Fixed,
            commission_value: Decimal::from_i64(5),
            tax_rate_percent: Decimal::from_i64(26),
            language: "en".to_string(),
            nationality: "US".to_string(),
        }
    }
}
