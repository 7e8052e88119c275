use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

/// Rate limiting is only active when `url` is set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: i64,
    pub window_seconds: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KafkaConfig {
    pub brokers: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    #[serde(default)]
    pub enforce_on_bookings: bool,
}

/// Where the booking side finds flight inventory. Without `base_url` the
/// in-process flight service is used.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InventoryConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub inventory_timeout_ms: u64,
}

impl BookingConfig {
    pub fn inventory_timeout(&self) -> Duration {
        Duration::from_millis(self.inventory_timeout_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SKYBOOK__SERVER__PORT=9090` sets `server.port`
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Cross-field rules serde cannot express.
    pub fn check(&self) -> Result<(), config::ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(config::ConfigError::Message(
                "storage.backend = \"postgres\" requires database.url".to_string(),
            ));
        }
        if self.rate_limit.requests_per_window < 1 || self.rate_limit.window_seconds < 1 {
            return Err(config::ConfigError::Message(
                "rate_limit values must be positive".to_string(),
            ));
        }
        if self.booking.inventory_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "booking.inventory_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    const DEFAULT_TOML: &str = include_str!("../../config/default.toml");

    fn parse(extra: &str) -> Result<Config, config::ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml))
            .add_source(File::from_str(extra, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    #[test]
    fn test_default_file_is_complete() {
        let config = parse("").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.redis.url.is_none());
        assert!(config.inventory.base_url.is_none());
        assert!(config.booking.inventory_timeout() > Duration::ZERO);
    }

    #[test]
    fn test_postgres_needs_database_url() {
        let err = parse("[storage]\nbackend = \"postgres\"\n").unwrap_err();
        assert!(err.to_string().contains("database.url"));

        let config = parse(
            "[storage]\nbackend = \"postgres\"\n[database]\nurl = \"postgres://localhost/skybook\"\n",
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse("[booking]\ninventory_timeout_ms = 0\n").is_err());
    }
}
