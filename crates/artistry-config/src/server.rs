use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("STORE_BACKEND must be `postgres` or `memory`, got `{0}`")]
    UnknownStoreBackend(String),
}

/// Which [`Store`](https://docs.rs/artistry-db) implementation to run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    /// Reads a `STORE_BACKEND` value; unset or blank means PostgreSQL.
    pub fn from_setting(raw: Option<&str>) -> Result<Self, ConfigError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(StoreBackend::Postgres),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::UnknownStoreBackend(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub log_dir: String,
    pub store_backend: StoreBackend,
}

impl ServerConfig {
    /// Fails when `STORE_BACKEND` is set to an unknown store.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(9090),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string()),
            store_backend: StoreBackend::from_setting(env::var("STORE_BACKEND").ok().as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("postgres".parse(), Ok(StoreBackend::Postgres));
        assert_eq!("Memory".parse(), Ok(StoreBackend::Memory));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_unset_store_backend_defaults_to_postgres() {
        assert_eq!(StoreBackend::from_setting(None), Ok(StoreBackend::Postgres));
        assert_eq!(StoreBackend::from_setting(Some("  ")), Ok(StoreBackend::Postgres));
    }

    #[test]
    fn test_misspelled_store_backend_is_rejected() {
        let err = StoreBackend::from_setting(Some("memroy")).unwrap_err();
        assert_eq!(err, ConfigError::UnknownStoreBackend("memroy".to_string()));
        assert_eq!(err.to_string(), "STORE_BACKEND must be `postgres` or `memory`, got `memroy`");
    }
}
