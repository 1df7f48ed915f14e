use std::env;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::FixedOffset;
use thiserror::Error;

use crate::application::order_service::OrderSettings;
use crate::db::PoolSettings;
use crate::domain::pricing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}='{value}' is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool: PoolSettings,
    pub orders: OrderSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let tax_rate: BigDecimal = parse(&lookup, "TAX_RATE", "0.15")?;
        pricing::validate_tax_rate(&tax_rate).map_err(|e| ConfigError::Invalid {
            key: "TAX_RATE",
            value: tax_rate.to_string(),
            reason: e.to_string(),
        })?;

        let submit_attempts: u32 = parse(&lookup, "ORDER_SUBMIT_ATTEMPTS", "3")?;
        if submit_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "ORDER_SUBMIT_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        let offset_minutes: i32 = parse(&lookup, "STORE_UTC_OFFSET_MINUTES", "0")?;
        let store_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| ConfigError::Invalid {
                key: "STORE_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
                reason: "offset must be within ±24h".to_string(),
            })?;

        Ok(Config {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", "8080")?,
            pool: PoolSettings {
                max_size: parse(&lookup, "DB_POOL_SIZE", "10")?,
                statement_timeout_ms: parse(&lookup, "DB_STATEMENT_TIMEOUT_MS", "5000")?,
            },
            orders: OrderSettings {
                tax_rate,
                submit_attempts,
                store_offset,
            },
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
