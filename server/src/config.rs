//! Server configuration.

use std::net::SocketAddr;

use currex_common::{CurrencyCode, CurrexError};

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub max_connections: u32,
    /// Bridge currency for cross rates.
    pub reference_currency: String,
    /// Insert default currencies and rates at startup.
    pub seed: bool,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8000,
            database_url: "sqlite://currency_exchange.db?mode=rwc".to_string(),
            max_connections: 5,
            reference_currency: "USD".to_string(),
            seed: true,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("CURREX_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("CURREX_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(max) = lookup("CURREX_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.max_connections = max;
            }
        }

        if let Some(code) = lookup("CURREX_REFERENCE_CURRENCY") {
            config.reference_currency = code;
        }

        if let Some(seed) = lookup("CURREX_SEED") {
            config.seed = matches!(seed.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), CurrexError> {
        if self.listen_port == 0 {
            return Err(CurrexError::ConfigurationError(
                "Listen port cannot be 0".to_string(),
            ));
        }

        if self.database_url.is_empty() {
            return Err(CurrexError::ConfigurationError(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(CurrexError::ConfigurationError(
                "Max connections must be at least 1".to_string(),
            ));
        }

        self.reference_code()?;
        self.socket_addr()?;
        Ok(())
    }

    /// The reference currency as a parsed code.
    pub fn reference_code(&self) -> Result<CurrencyCode, CurrexError> {
        CurrencyCode::parse(&self.reference_currency).map_err(|_| {
            CurrexError::ConfigurationError(format!(
                "Invalid reference currency '{}'",
                self.reference_currency
            ))
        })
    }

    /// The address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, CurrexError> {
        format!("{}:{}", self.listen_addr, self.listen_port)
            .parse()
            .map_err(|e| CurrexError::ConfigurationError(format!("Invalid listen address: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_code().unwrap().as_str(), "USD");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.reference_currency = "DOLLAR".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.listen_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CURREX_LISTEN_PORT", "9001"),
            ("CURREX_REFERENCE_CURRENCY", "eur"),
            ("CURREX_SEED", "false"),
            ("CURREX_MAX_CONNECTIONS", "oops"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.listen_port, 9001);
        assert_eq!(config.reference_code().unwrap().as_str(), "EUR");
        assert!(!config.seed);
        // Unparseable values keep the default.
        assert_eq!(config.max_connections, 5);
    }
}
