/**
 * Server Configuration
 *
 * # Configuration Sources
 *
 * Configuration is assembled in layers, later layers winning:
 *
 * 1. Built-in defaults
 * 2. A TOML file, when `XFTEAM_CONFIG` names one
 * 3. Environment variables: `SERVER_PORT`, `DATABASE_URL`,
 *    `SWEEP_INTERVAL_SECS`, `LOCK_CLEANUP_INTERVAL_SECS`,
 *    `BROADCAST_CAPACITY`
 *
 * The result is validated before use.
 *
 * # Database
 *
 * Without `database_url` the server runs on the in-memory store. A database
 * that cannot be reached is logged and treated the same way.
 */

use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "XFTEAM_CONFIG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// PostgreSQL connection string; in-memory store when absent
    pub database_url: Option<String>,
    /// Seconds between sweeps that finish interrupted workspace removals
    pub sweep_interval_secs: u64,
    /// Seconds between cleanups of idle workspace locks
    pub lock_cleanup_interval_secs: u64,
    /// Capacity of the realtime event channel
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            sweep_interval_secs: 60,
            lock_cleanup_interval_secs: 300,
            broadcast_capacity: 1000,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::read_file(&path)?,
            None => Self::default(),
        };

        if let Some(port) = lookup("SERVER_PORT") {
            config.port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            config.database_url = Some(url);
        }
        if let Some(secs) = lookup("SWEEP_INTERVAL_SECS") {
            config.sweep_interval_secs = parse_value("SWEEP_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("LOCK_CLEANUP_INTERVAL_SECS") {
            config.lock_cleanup_interval_secs = parse_value("LOCK_CLEANUP_INTERVAL_SECS", &secs)?;
        }
        if let Some(capacity) = lookup("BROADCAST_CAPACITY") {
            config.broadcast_capacity = parse_value("BROADCAST_CAPACITY", &capacity)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "sweep_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.lock_cleanup_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "lock_cleanup_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "broadcast_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn lock_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.lock_cleanup_interval_secs)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn sweep_interval_secs(mut self, secs: u64) -> Self {
        self.config.sweep_interval_secs = secs;
        self
    }

    pub fn lock_cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.config.lock_cleanup_interval_secs = secs;
        self
    }

    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.config.broadcast_capacity = capacity;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if the connection fails; the caller falls back to memory
pub async fn load_database(database_url: &str) -> Option<PgPool> {
    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/xfteam"),
            ("SWEEP_INTERVAL_SECS", "5"),
            ("BROADCAST_CAPACITY", "16"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/xfteam"));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.lock_cleanup_interval_secs, 300);
        assert_eq!(config.broadcast_capacity, 16);
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let config = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")]));
        assert_matches!(result, Err(ConfigError::InvalidValue { key: "SERVER_PORT", .. }));
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let result = ServerConfig::builder().broadcast_capacity(0).build();
        assert_matches!(result, Err(ConfigError::ValidationFailed(_)));
    }

    #[test]
    fn test_file_then_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000").unwrap();
        writeln!(file, "sweep_interval_secs = 30").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let from_file = ServerConfig::from_file(&path).unwrap();
        assert_eq!(from_file.port, 4000);
        assert_eq!(from_file.sweep_interval_secs, 30);
        assert_eq!(from_file.broadcast_capacity, 1000);

        let layered = ServerConfig::from_lookup(lookup_from(&[
            (CONFIG_FILE_ENV, path.as_str()),
            ("SERVER_PORT", "5000"),
        ]))
        .unwrap();
        assert_eq!(layered.port, 5000);
        assert_eq!(layered.sweep_interval_secs, 30);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ServerConfig::from_file("/definitely/not/here.toml");
        assert_matches!(result, Err(ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert_matches!(ServerConfig::from_file(file.path()), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .port(0)
            .database_url("postgres://db/xfteam")
            .sweep_interval_secs(1)
            .lock_cleanup_interval_secs(2)
            .build()
            .unwrap();
        assert_eq!(config.port, 0);
        assert_eq!(config.database_url.as_deref(), Some("postgres://db/xfteam"));
        assert_eq!(config.lock_cleanup_interval(), Duration::from_secs(2));
    }
}
