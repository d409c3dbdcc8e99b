use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///tmp/rates.db";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }
}

/// Settings for the upstream rate provider, read from `FIXER_*` and `CURRENCIES`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub access_key: String,
    pub symbols: Vec<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        let endpoint = required_var("FIXER_ENDPOINT")?;
        let access_key = required_var("FIXER_KEY")?;
        let symbols = parse_symbols(&required_var("CURRENCIES")?);
        if symbols.is_empty() {
            anyhow::bail!("CURRENCIES must list at least one currency symbol");
        }
        let timeout_secs =
            parse_var("FETCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        Ok(Self {
            endpoint,
            access_key,
            symbols,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("Environment variable {} is not set", name))
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Can't parse {}={}", name, value)),
        Err(_) => Ok(None),
    }
}
