//! Configuration for varq.

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection URL
    #[serde(default = "default_db_url")]
    pub db_url: String,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub db_pool_size: u32,

    /// Server host to bind
    #[serde(default = "default_host")]
    pub server_host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            db_pool_size: default_pool_size(),
            server_host: default_host(),
            server_port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.db_url = url;
        }
        if let Ok(size) = std::env::var("VARQ_DB_POOL") {
            if let Ok(n) = size.parse() {
                config.db_pool_size = n;
            }
        }
        if let Ok(host) = std::env::var("VARQ_SERVER_HOST") {
            config.server_host = host;
        }
        if let Ok(port) = std::env::var("VARQ_SERVER_PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.server_port = p;
            }
        }

        config
    }
}

// Default value functions
fn default_db_url() -> String {
    "mysql://root@localhost:9030/sd".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.db_pool_size, 10);
        assert_eq!(config.server_host, "127.0.0.1");
    }
}
