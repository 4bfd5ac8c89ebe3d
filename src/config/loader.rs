//! Load ExplorerConfig from environment variables.

use crate::config::types::ExplorerConfig;
use crate::error::ConfigError;
use std::str::FromStr;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_BODY_LIMIT_BYTES: &str = "BODY_LIMIT_BYTES";
pub const ENV_DEFAULT_PAGE_LIMIT: &str = "DEFAULT_PAGE_LIMIT";
pub const ENV_AUTO_INCREMENT_ON_ERROR: &str = "AUTO_INCREMENT_ON_ERROR";

impl ExplorerConfig {
    /// Read settings from the process environment; unset keys keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ExplorerConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_DATABASE_URL) {
            config.database_url = url;
        }
        if let Some(addr) = get(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(v) = get(ENV_MAX_CONNECTIONS) {
            config.max_connections = parse_number(ENV_MAX_CONNECTIONS, &v)?;
            if config.max_connections == 0 {
                return Err(ConfigError::Validation(format!("{} must be at least 1", ENV_MAX_CONNECTIONS)));
            }
        }
        if let Some(v) = get(ENV_BODY_LIMIT_BYTES) {
            config.body_limit_bytes = parse_number(ENV_BODY_LIMIT_BYTES, &v)?;
        }
        if let Some(v) = get(ENV_DEFAULT_PAGE_LIMIT) {
            config.default_page_limit = parse_number(ENV_DEFAULT_PAGE_LIMIT, &v)?;
        }
        if let Some(v) = get(ENV_AUTO_INCREMENT_ON_ERROR) {
            config.auto_increment_on_error = v.parse()?;
        }
        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{} must be a non-negative integer, got '{}'", key, value)))
}
