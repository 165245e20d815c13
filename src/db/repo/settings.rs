//! Per-user settings operations.

use crate::domain::{CommissionMode, Settings};
use sqlx::Row;
use std::str::FromStr;

use super::{parse_decimal_column, Repository};

impl Repository {
    /// Fetch settings for a user, falling back to defaults when no row
    /// exists. Matches the historical behavior of serving defaults to
    /// first-time users instead of erroring.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_settings(&self, user_id: &str) -> Result<Settings, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT currency, market, theme, commission_mode, commission_value,
                   tax_rate_percent, language, nationality
            FROM user_settings
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => {
                let raw_commission = row.get::<String, _>("commission_value");
                let raw_tax = row.get::<String, _>("tax_rate_percent");
                Settings {
                    currency: row.get("currency"),
                    market: row.get("market"),
                    theme: row.get("theme"),
                    commission_mode: CommissionMode::from_str(
                        &row.get::<String, _>("commission_mode"),
                    )
                    .unwrap_or(CommissionMode::Fixed),
                    commission_value: parse_decimal_column("commission_value", &raw_commission),
                    tax_rate_percent: parse_decimal_column("tax_rate_percent", &raw_tax),
                    language: row.get("language"),
                    nationality: row.get("nationality"),
                }
            }
            None => Settings::default(),
        })
    }

    /// Insert or replace settings for a user.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn save_settings(
        &self,
        user_id: &str,
        settings: &Settings,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO user_settings
            (user_id, currency, market, theme, commission_mode, commission_value,
             tax_rate_percent, language, nationality)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&settings.currency)
        .bind(&settings.market)
        .bind(&settings.theme)
        .bind(settings.commission_mode.to_string())
        .bind(settings.commission_value.to_canonical_string())
        .bind(settings.tax_rate_percent.to_canonical_string())
        .bind(&settings.language)
        .bind(&settings.nationality)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
