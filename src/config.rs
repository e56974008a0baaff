//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::DEFAULT_VERSION;

/// Cache service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the cache database
    pub db_name: String,
    /// Schema version the database is opened at
    pub db_version: u32,
    /// Directory holding database snapshot files
    pub data_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DB_NAME` - Database name (default: offline-cache)
    /// - `CACHE_DB_VERSION` - Database version (default: 1)
    /// - `CACHE_DATA_DIR` - Snapshot directory (default: ./data)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_name: env::var("CACHE_DB_NAME").unwrap_or(defaults.db_name),
            db_version: env::var("CACHE_DB_VERSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_version),
            data_dir: env::var("CACHE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_name: "offline-cache".to_string(),
            db_version: DEFAULT_VERSION,
            data_dir: PathBuf::from("./data"),
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_name, "offline-cache");
        assert_eq!(config.db_version, 1);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DB_NAME");
        env::remove_var("CACHE_DB_VERSION");
        env::remove_var("CACHE_DATA_DIR");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.db_name, "offline-cache");
        assert_eq!(config.db_version, 1);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.server_port, 3000);
    }
}
