use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: &str = "8000";
const DEFAULT_TABLE_NAME: &str = "imagesDB";
const TEST_NAMESPACE_SUFFIX: &str = "_test";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend {other:?}")),
        }
    }
}

/// Where the document store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Empty means the regional AWS endpoint
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl StoreConfig {
    /// Endpoint override for DynamoDB Local and friends
    pub fn endpoint_url(&self) -> Option<String> {
        if self.host.is_empty() {
            return None;
        }
        Some(format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub backend: StoreBackend,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests need not touch the
    /// process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut database_name = load_or(&lookup, "TABLE_NAME", DEFAULT_TABLE_NAME);
        if lookup("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("test")) {
            database_name.push_str(TEST_NAMESPACE_SUFFIX);
        }

        Ok(Self {
            store: StoreConfig {
                host: load_or(&lookup, "DB_HOST", DEFAULT_DB_HOST),
                port: try_load(&lookup, "DB_PORT", DEFAULT_DB_PORT)?,
                database_name,
            },
            backend: try_load(&lookup, "IMAGE_STORE", "dynamodb")?,
            cors_origin: load_or(&lookup, "CORS_ORIGIN", "*"),
        })
    }
}

fn load_or<F>(lookup: &F, key: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default:?}");
        default.to_string()
    })
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = load_or(lookup, key, default);
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError::InvalidValue {
            key,
            value,
            reason: e.to_string(),
        }
    })
}
