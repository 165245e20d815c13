use crate::domain::{CommissionMode, CommissionSpec, Decimal};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Process configuration, sourced from the environment.
///
/// Commission and tax values here are the server-wide fallbacks used when a
/// user has no stored settings and a request carries no override.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub default_currency: String,
    pub default_market: String,
    pub commission_mode: CommissionMode,
    pub commission_value: Decimal,
    pub tax_rate_percent: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let default_currency = env_map
            .get("DEFAULT_CURRENCY")
            .cloned()
            .unwrap_or_else(|| "EUR".to_string());

        let default_market = env_map
            .get("DEFAULT_MARKET")
            .cloned()
            .unwrap_or_else(|| "NYSE".to_string());

        let commission_mode = CommissionMode::from_str(
            env_map
                .get("COMMISSION_MODE")
                .map(|s| s.as_str())
                .unwrap_or("fixed"),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "COMMISSION_MODE".to_string(),
                "must be fixed or percentage".to_string(),
            )
        })?;

        let commission_value = parse_decimal(&env_map, "COMMISSION_VALUE", "5")?;
        if commission_value.is_negative() {
            return Err(ConfigError::InvalidValue(
                "COMMISSION_VALUE".to_string(),
                "must be >= 0".to_string(),
            ));
        }

        let tax_rate_percent = parse_decimal(&env_map, "TAX_RATE_PERCENT", "26")?;
        if tax_rate_percent.is_negative() {
            return Err(ConfigError::InvalidValue(
                "TAX_RATE_PERCENT".to_string(),
                "must be >= 0".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            default_currency,
            default_market,
            commission_mode,
            commission_value,
            tax_rate_percent,
        })
    }

    pub fn commission(&self) -> CommissionSpec {
        CommissionSpec {
            mode: self.commission_mode,
            value: self.commission_value,
        }
    }
}

fn parse_decimal(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Decimal, ConfigError> {
    Decimal::from_str_canonical(env_map.get(key).map(|s| s.as_str()).unwrap_or(default)).map_err(
        |_| ConfigError::InvalidValue(key.to_string(), "must be a decimal number".to_string()),
    )
}
