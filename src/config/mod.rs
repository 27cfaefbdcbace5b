//! Configuration loading and management
//!
//! All configuration comes from the environment and is resolved once at
//! startup into an explicit [`AppConfig`]; nothing reads environment
//! variables after boot.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SHIPMENT_BASE_URL: &str = "https://swift-cynde-be-demo-4c30490b.koyeb.app";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` runs the in-memory stores.
    pub database_url: Option<String>,
    /// Base URL of the external shipment provider.
    pub shipment_base_url: String,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// - `HOST` (default `0.0.0.0`) and `PORT` (default 8000)
    /// - `DATABASE_URL` (optional)
    /// - `SHIPMENT_BASE_URL` (defaults to the hosted provider)
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = match env::var("HOST") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "HOST",
                value: raw,
            })?,
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port: u16 = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let shipment_base_url = env::var("SHIPMENT_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SHIPMENT_BASE_URL.to_string());

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            database_url,
            shipment_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Environment-free construction path
        let config = AppConfig {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database_url: None,
            shipment_base_url: DEFAULT_SHIPMENT_BASE_URL.to_string(),
        };
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(config.database_url.is_none());
        assert!(config.shipment_base_url.starts_with("https://"));
    }
}
