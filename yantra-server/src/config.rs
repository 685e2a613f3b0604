//! Server configuration
//!
//! Every variable is read once at start-up. Missing required variables abort
//! the process before any listener is bound.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum pooled connections
    pub db_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Allowed CORS origins (comma-separated); empty allows any origin
    pub cors_origins: Vec<String>,
    /// HMAC secret for identity-provider session tokens
    pub jwt_secret: String,
    /// Identity-provider webhook signing secret (`whsec_...`)
    pub identity_webhook_secret: String,
    /// Payment gateway key id
    pub razorpay_key_id: String,
    /// Payment gateway key secret
    pub razorpay_key_secret: String,
    /// WhatsApp Cloud API access token
    pub whatsapp_api_token: String,
    /// WhatsApp sender phone number id
    pub whatsapp_phone_number_id: String,
    /// Admin WhatsApp number receiving order alerts
    pub admin_phone: String,
    /// Admin mailbox receiving order alerts
    pub admin_email: String,
    /// Sender address for outgoing email
    pub mail_from: String,
    /// Region override for the SES client; the AWS default chain otherwise
    pub ses_region: Option<String>,
    /// Flat shipping fee added to every order
    pub shipping_flat_fee: Decimal,
    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Option<Decimal>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            db_max_connections: parse_or(optional("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10)?,
            http_port: parse_or(optional("HTTP_PORT"), "HTTP_PORT", 8080)?,
            environment: optional("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            cors_origins: optional("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            jwt_secret: require("JWT_SECRET")?,
            identity_webhook_secret: require("IDENTITY_WEBHOOK_SECRET")?,
            razorpay_key_id: require("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: require("RAZORPAY_KEY_SECRET")?,
            whatsapp_api_token: require("WHATSAPP_API_TOKEN")?,
            whatsapp_phone_number_id: require("WHATSAPP_PHONE_NUMBER_ID")?,
            admin_phone: require("ADMIN_PHONE")?,
            admin_email: require("ADMIN_EMAIL")?,
            mail_from: require("MAIL_FROM")?,
            ses_region: optional("SES_REGION").map(|v| v.trim().to_string()),
            shipping_flat_fee: optional("SHIPPING_FLAT_FEE")
                .map(|v| parse_amount("SHIPPING_FLAT_FEE", v))
                .transpose()?
                .unwrap_or(Decimal::ZERO),
            free_shipping_threshold: optional("FREE_SHIPPING_THRESHOLD")
                .map(|v| parse_amount("FREE_SHIPPING_THRESHOLD", v))
                .transpose()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

/// Money amounts must not be negative
fn parse_amount(name: &'static str, value: String) -> Result<Decimal, ConfigError> {
    let amount: Decimal = parse(name, value.clone())?;
    if amount.is_sign_negative() {
        return Err(ConfigError::Invalid { name, value });
    }
    Ok(amount)
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |v| parse(name, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/yantra"),
            ("JWT_SECRET", "jwt-secret"),
            ("IDENTITY_WEBHOOK_SECRET", "whsec_c2VjcmV0"),
            ("RAZORPAY_KEY_ID", "rzp_test_key"),
            ("RAZORPAY_KEY_SECRET", "rzp_secret"),
            ("WHATSAPP_API_TOKEN", "wa-token"),
            ("WHATSAPP_PHONE_NUMBER_ID", "1234567890"),
            ("ADMIN_PHONE", "919800000000"),
            ("ADMIN_EMAIL", "admin@example.com"),
            ("MAIL_FROM", "orders@example.com"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn loads_with_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.environment, "development");
        assert_eq!(config.shipping_flat_fee, Decimal::ZERO);
        assert!(config.free_shipping_threshold.is_none());
        assert!(config.cors_origins.is_empty());
        assert!(config.ses_region.is_none());
    }

    #[test]
    fn missing_required_variable_fails_fast() {
        let mut env = base_env();
        env.remove("RAZORPAY_KEY_SECRET");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Missing("RAZORPAY_KEY_SECRET")
        );

        let mut env = base_env();
        env.insert("JWT_SECRET", "   ");
        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn parses_optional_values() {
        let mut env = base_env();
        env.insert("HTTP_PORT", "9000");
        env.insert("SHIPPING_FLAT_FEE", "49.50");
        env.insert("FREE_SHIPPING_THRESHOLD", "999");
        env.insert("CORS_ORIGINS", "https://shop.example.com, http://localhost:5173");
        env.insert("SES_REGION", "ap-south-1");
        let config = load(&env).unwrap();
        assert_eq!(config.ses_region.as_deref(), Some("ap-south-1"));
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.shipping_flat_fee, Decimal::new(4950, 2));
        assert_eq!(config.free_shipping_threshold, Some(Decimal::from(999)));
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let mut env = base_env();
        env.insert("HTTP_PORT", "eighty");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "HTTP_PORT", .. })
        ));
    }

    #[test]
    fn rejects_negative_shipping_amounts() {
        let mut env = base_env();
        env.insert("SHIPPING_FLAT_FEE", "-50");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                name: "SHIPPING_FLAT_FEE",
                value: "-50".into()
            }
        );

        let mut env = base_env();
        env.insert("FREE_SHIPPING_THRESHOLD", "-1");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: "FREE_SHIPPING_THRESHOLD",
                ..
            })
        ));

        let mut env = base_env();
        env.insert("SHIPPING_FLAT_FEE", "0");
        assert_eq!(load(&env).unwrap().shipping_flat_fee, Decimal::ZERO);
    }
}
