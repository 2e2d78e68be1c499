//! Configuration management
//!
//! Typed configuration with TOML file loading, environment overrides
//! (the `PALAVER_*` family), and validation. Every section has a
//! sensible default so a bare process starts without any file.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;
mod feature_flags;

pub use error::ConfigError;
pub use feature_flags::FeatureFlags;

use crate::core_events::DEFAULT_EVENT_CAPACITY;
use crate::core_presence::DEFAULT_TYPING_TTL;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Presence configuration
    pub presence: PresenceConfig,

    /// Event broadcasting configuration
    pub events: EventsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Feature flags
    pub features: FeatureFlags,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("valid default address"),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file path
    pub db_path: PathBuf,

    /// Hold all durable state in memory (tests, throwaway instances)
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("palaver.db"),
            in_memory: false,
        }
    }
}

/// Presence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Time-to-live of an unrefreshed typing signal
    #[serde(with = "humantime_serde")]
    pub typing_ttl: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            typing_ttl: DEFAULT_TYPING_TTL,
        }
    }
}

/// Event broadcasting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Per-topic broadcast channel capacity
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Emit JSON-formatted lines
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then an optional TOML file, then
    /// `PALAVER_*` environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply `PALAVER_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(addr) = env::var("PALAVER_BIND_ADDRESS") {
            self.server.bind_address = addr
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("bad PALAVER_BIND_ADDRESS: {}", addr)))?;
        }
        if let Ok(path) = env::var("PALAVER_DB_PATH") {
            self.store.db_path = PathBuf::from(path);
        }
        if let Ok(value) = env::var("PALAVER_IN_MEMORY") {
            self.store.in_memory = parse_bool("PALAVER_IN_MEMORY", &value)?;
        }
        if let Ok(millis) = env::var("PALAVER_TYPING_TTL_MS") {
            let millis: u64 = millis.parse().map_err(|_| {
                ConfigError::Invalid(format!("bad PALAVER_TYPING_TTL_MS: {}", millis))
            })?;
            self.presence.typing_ttl = Duration::from_millis(millis);
        }
        if let Ok(capacity) = env::var("PALAVER_EVENT_CAPACITY") {
            self.events.capacity = capacity.parse().map_err(|_| {
                ConfigError::Invalid(format!("bad PALAVER_EVENT_CAPACITY: {}", capacity))
            })?;
        }
        if let Ok(level) = env::var("PALAVER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = env::var("PALAVER_LOG_JSON") {
            self.logging.json_format = parse_bool("PALAVER_LOG_JSON", &value)?;
        }
        if let Ok(value) = env::var("PALAVER_AUTO_JOIN_CHANNELS") {
            self.features.auto_join_channels = parse_bool("PALAVER_AUTO_JOIN_CHANNELS", &value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.capacity == 0 {
            return Err(ConfigError::Invalid(
                "events.capacity must be greater than zero".to_string(),
            ));
        }
        if self.presence.typing_ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "presence.typing_ttl must be greater than zero".to_string(),
            ));
        }
        self.logging
            .level
            .parse::<crate::logging::LogLevel>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("bad {}: {}", name, other))),
    }
}
