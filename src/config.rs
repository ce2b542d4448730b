//! Process configuration.
//!
//! Loaded from environment variables, every one of them optional.

use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory scanned for route modules.
pub const DEFAULT_ROUTES_DIR: &str = "api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind (`HOST`, default `0.0.0.0`).
    pub host: IpAddr,

    /// Listening port (`PORT`, default 3000).
    pub port: u16,

    /// Root of the route module tree (`ROUTES_DIR`, default `api`).
    pub routes_dir: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be an integer between 1 and 65535, got '{0}'")]
    InvalidPort(String),

    #[error("HOST must be an IP address, got '{0}'")]
    InvalidHost(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = match vars.get("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw.clone())),
            },
            None => DEFAULT_PORT,
        };

        let host = match vars.get("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw.clone()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let routes_dir = vars
            .get("ROUTES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUTES_DIR));

        Ok(Self { host, port, routes_dir })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
