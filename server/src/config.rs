//! Configuration management for the server.

use std::env;
use std::path::PathBuf;
use tabula_engine::DEFAULT_PAGE_SIZE;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Page size for tables created without one
    pub default_page_size: usize,
    /// JSON file of tables to create at startup
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_page_size: DEFAULT_PAGE_SIZE,
            seed_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let default_page_size = match lookup("TABULA_DEFAULT_PAGE_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidPageSize),
            },
            None => defaults.default_page_size,
        };

        let seed_file = lookup("TABULA_SEED_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            default_page_size,
            seed_file,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("TABULA_DEFAULT_PAGE_SIZE must be a positive integer")]
    InvalidPageSize,
}
