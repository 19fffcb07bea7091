//! Environment-backed application configuration.

use std::env;
use std::net::SocketAddr;

use crate::domain::ConfigError;

/// Settings the binary reads at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Origin allowed by the CORS policy (the Vue dev server by default).
    pub allowed_origin: String,
}

impl AppConfig {
    /// Reads configuration from the environment.
    ///
    /// `DATABASE_URL` is required; `BIND_ADDR` and `ALLOWED_ORIGIN` have
    /// development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let config = Self {
            database_url,
            bind_addr,
            allowed_origin,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "BIND_ADDR".to_string(),
                message: "not a socket address".to_string(),
            });
        }

        if self.database_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "DATABASE_URL".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
