//! Configuration management for the building portal server

use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

/// Meeting-room booking rules
#[derive(Debug, Deserialize, Clone)]
pub struct BookingsConfig {
    /// Business hours opening time (HH:MM:SS)
    pub open_time: NaiveTime,
    /// Business hours closing time (HH:MM:SS)
    pub close_time: NaiveTime,
    /// Refuse bookings that overlap a pending or approved booking of the same room
    pub reject_overlaps: bool,
}

/// Service request attachment rules
#[derive(Debug, Deserialize, Clone)]
pub struct RequestsConfig {
    pub max_document_bytes: u64,
    pub accepted_extensions: Vec<String>,
}

/// Invoice rules
#[derive(Debug, Deserialize, Clone)]
pub struct BillingConfig {
    /// Consumption tax applied to the invoice subtotal
    pub tax_rate: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Load the mock buildings, rooms, users, bookings and requests at startup
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub bookings: BookingsConfig,
    #[serde(default)]
    pub requests: RequestsConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BUILDING_PORTAL_)
            .add_source(
                Environment::with_prefix("BUILDING_PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override JWT secret from JWT_SECRET env var if present
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave a workflow unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bookings.close_time <= self.bookings.open_time {
            return Err(ConfigError::Message(format!(
                "bookings.close_time ({}) must be after bookings.open_time ({})",
                self.bookings.close_time, self.bookings.open_time
            )));
        }
        if self.billing.tax_rate.is_sign_negative() {
            return Err(ConfigError::Message(format!(
                "billing.tax_rate must not be negative, got {}",
                self.billing.tax_rate
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for BookingsConfig {
    fn default() -> Self {
        Self {
            open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            close_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            reject_overlaps: true,
        }
    }
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
            accepted_extensions: [".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png", ".gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn business_hours_must_be_ordered() {
        let mut config = AppConfig::default();
        config.bookings.close_time = config.bookings.open_time;
        assert!(matches!(config.validate(), Err(ConfigError::Message(_))));

        config.bookings.close_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_tax_rate_is_rejected() {
        let mut config = AppConfig::default();
        config.billing.tax_rate = Decimal::new(-5, 2);
        assert!(config.validate().is_err());
    }
}
