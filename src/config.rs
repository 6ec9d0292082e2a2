//! Client configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! reminders_key = "reminders"
//! refetch_on_invalidate = true
//! fetch_timeout_ms = 10000
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheKey;

/// Cache key used for the reminder list unless configured otherwise.
pub const DEFAULT_REMINDERS_KEY: &str = "reminders";

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    Io(String),
    /// The document is not valid TOML or has wrongly typed fields.
    Parse(String),
    /// A field holds a value outside its allowed range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config io error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Settings shared by the query cache and the toggle controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cache key under which the reminder list is stored.
    pub reminders_key: String,
    /// Start a refetch as soon as a key is invalidated. When off, the entry is
    /// only marked stale and the next `fetch` goes to the source.
    pub refetch_on_invalidate: bool,
    /// Upper bound for a single load from the source.
    pub fetch_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reminders_key: DEFAULT_REMINDERS_KEY.to_string(),
            refetch_on_invalidate: true,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reminders_key.trim().is_empty() {
            return Err(ConfigError::Invalid("reminders_key must not be empty".into()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn reminders_key(&self) -> CacheKey {
        CacheKey::new(self.reminders_key.clone())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
