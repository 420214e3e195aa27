//! Service configuration
//!
//! Settings come from `LODGING_*` environment variables layered over the
//! defaults below. `LODGING_DATABASE_URL` overrides `database_url`,
//! `LODGING_GST_RATE_PERCENT` overrides `gst_rate_percent`, and so on.

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::{Currency, Rate, Timezone};
use domain_lifecycle::BillingSettings;
use infra_db::DatabaseConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LODGING";

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/lodging";

/// Lodging service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_connect_timeout_secs: u64,
    /// Apply pending migrations during bootstrap
    pub run_migrations: bool,
    /// Currency every amount is billed in
    pub currency: Currency,
    /// GST rate as a percentage, e.g. `18`
    pub gst_rate_percent: Decimal,
    pub gst_invoice_prefix: String,
    pub non_gst_invoice_prefix: String,
    /// IANA name of the property's timezone; "today" is computed there
    pub timezone: Timezone,
    /// Log filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl ServiceConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from the given environment source over the defaults
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("db_max_connections", 10)?
            .set_default("db_min_connections", 2)?
            .set_default("db_connect_timeout_secs", 30)?
            .set_default("run_migrations", true)?
            .set_default("currency", "INR")?
            .set_default("gst_rate_percent", "18")?
            .set_default("gst_invoice_prefix", "GST")?
            .set_default("non_gst_invoice_prefix", "INV")?
            .set_default("timezone", "Asia/Kolkata")?
            .set_default("log_level", "info")?
            .set_default("log_json", false)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gst_rate_percent.is_sign_negative() || self.gst_rate_percent > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Message(format!(
                "gst_rate_percent must be between 0 and 100, got {}",
                self.gst_rate_percent
            )));
        }
        if self.gst_invoice_prefix.trim().is_empty() || self.non_gst_invoice_prefix.trim().is_empty() {
            return Err(ConfigError::Message("invoice prefixes must not be empty".to_string()));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(ConfigError::Message(format!(
                "db_min_connections ({}) exceeds db_max_connections ({})",
                self.db_min_connections, self.db_max_connections
            )));
        }
        Ok(())
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
    }

    pub fn gst_rate(&self) -> Rate {
        Rate::from_percentage(self.gst_rate_percent)
    }

    pub fn billing(&self) -> BillingSettings {
        BillingSettings::new(self.currency, self.gst_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_environment(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.currency, Currency::INR);
        assert_eq!(config.gst_rate(), Rate::from_percentage(dec!(18)));
        assert_eq!(config.gst_invoice_prefix, "GST");
        assert_eq!(config.non_gst_invoice_prefix, "INV");
        assert!(config.run_migrations);
        assert!(!config.log_json);
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("LODGING_DATABASE_URL", "postgres://db.internal/hotel"),
            ("LODGING_GST_RATE_PERCENT", "12"),
            ("LODGING_DB_MAX_CONNECTIONS", "40"),
            ("LODGING_TIMEZONE", "Europe/London"),
            ("LODGING_LOG_JSON", "true"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "postgres://db.internal/hotel");
        assert_eq!(config.gst_rate(), Rate::from_percentage(dec!(12)));
        assert_eq!(config.database().max_connections, 40);
        assert_eq!(config.timezone, Timezone::parse("Europe/London").unwrap());
        assert!(config.log_json);
    }

    #[test]
    fn test_rejects_out_of_range_gst() {
        assert!(load(&[("LODGING_GST_RATE_PERCENT", "150")]).is_err());
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        assert!(load(&[("LODGING_TIMEZONE", "Mars/Olympus")]).is_err());
    }

    #[test]
    fn test_billing_settings_follow_config() {
        let config = load(&[("LODGING_CURRENCY", "USD")]).unwrap();
        let billing = config.billing();

        assert_eq!(billing.currency, Currency::USD);
        assert_eq!(billing.gst_rate, Rate::from_percentage(dec!(18)));
    }
}
