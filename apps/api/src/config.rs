//! Storefront API configuration module.
//!
//! Configuration is resolved in three layers, highest priority first:
//!
//! ```text
//! STOREFRONT_* environment variables
//!        │ override
//!        ▼
//! storefront.toml (path from STOREFRONT_CONFIG, optional)
//!        │ override
//!        ▼
//! built-in defaults
//! ```
//!
//! ## Example file
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "storefront.db"
//!
//! [seed]
//! enabled = true
//! base_url = "https://fakestoreapi.com"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_db::DbConfig;

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// Config file used when `STOREFRONT_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "storefront.toml";

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront_api=debug,storefront_db=debug";

/// Storefront API configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Allowed CORS origins; empty allows none.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file (created if missing).
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("storefront.db"),
            max_connections: 5,
        }
    }
}

/// `[seed]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Import from the catalogue API at startup when tables are empty.
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            enabled: true,
            base_url: "https://fakestoreapi.com".to_string(),
            timeout_secs: 15,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads file + environment, then validates.
    ///
    /// A missing default file is fine; a missing file named explicitly by
    /// `STOREFRONT_CONFIG` is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() || explicit.is_some() {
            Self::from_file(&path)?
        } else {
            ApiConfig::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses TOML text; absent keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    ///
    /// | Env Var                    | Field                 |
    /// |----------------------------|-----------------------|
    /// | `STOREFRONT_HOST`          | `server.host`         |
    /// | `STOREFRONT_PORT`          | `server.port`         |
    /// | `STOREFRONT_DB_PATH`       | `database.path`       |
    /// | `STOREFRONT_SEED_ENABLED`  | `seed.enabled`        |
    /// | `STOREFRONT_SEED_URL`      | `seed.base_url`       |
    /// | `STOREFRONT_LOG`           | `logging.filter`      |
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("STOREFRONT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("STOREFRONT_PORT") {
            self.server.port = parse_env("STOREFRONT_PORT", &port)?;
        }
        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(enabled) = lookup("STOREFRONT_SEED_ENABLED") {
            self.seed.enabled = parse_env("STOREFRONT_SEED_ENABLED", &enabled)?;
        }
        if let Some(url) = lookup("STOREFRONT_SEED_URL") {
            self.seed.base_url = url;
        }
        if let Some(filter) = lookup("STOREFRONT_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    /// Rejects values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        self.host_ip()?;
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be positive".into(),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be positive".into(),
            ));
        }
        if self.seed.enabled {
            if !(self.seed.base_url.starts_with("http://")
                || self.seed.base_url.starts_with("https://"))
            {
                return Err(ConfigError::Invalid(format!(
                    "seed.base_url '{}' must be an http(s) URL",
                    self.seed.base_url
                )));
            }
            if self.seed.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "seed.timeout_secs must be positive".into(),
                ));
            }
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.host_ip()?, self.server.port))
    }

    fn host_ip(&self) -> Result<IpAddr, ConfigError> {
        self.server.host.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.host '{}' is not an IP address",
                self.server.host
            ))
        })
    }

    /// Pool settings for [`storefront_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    pub fn seed_timeout(&self) -> Duration {
        Duration::from_secs(self.seed.timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApiConfig::from_toml_str(
            r#"
            [server]
            port = 9090

            [seed]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.seed.enabled);
        assert_eq!(config.database.path, PathBuf::from("storefront.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_PORT", "7000"),
            ("STOREFRONT_DB_PATH", "/tmp/shop.db"),
            ("STOREFRONT_SEED_ENABLED", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = ApiConfig::from_toml_str("[server]\nport = 9090\n").unwrap();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_env(|key| (key == "STOREFRONT_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ApiConfig::default();
        config.seed.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let mut config = ApiConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 8081;
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8081");
    }
}
