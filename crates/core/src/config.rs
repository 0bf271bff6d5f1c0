//! Store configuration via `devicedir.toml`
//!
//! The file is optional. A missing field falls back to the layout existing
//! deployments use, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::keys::{KeyLayout, DEVICE_COLLECTION, KEY_SEPARATOR};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "devicedir.toml";

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// Config path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written
    #[error("failed to write config file '{}': {source}", path.display())]
    Write {
        /// Config path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`StoreConfig`]
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// TOML failure
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be rendered as TOML
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings for a Redis-compatible substrate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`
    #[serde(default = "default_redis_url")]
    pub url: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: default_redis_url(),
        }
    }
}

/// Device directory configuration loaded from `devicedir.toml`
///
/// # Example
///
/// ```toml
/// collection = "md|dv"
/// separator = ":"
///
/// [redis]
/// url = "redis://127.0.0.1:6379/0"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Device table literal every key is rooted at
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Separator between key parts
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Substrate connection, absent when running in-process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,
}

fn default_collection() -> String {
    DEVICE_COLLECTION.to_string()
}

fn default_separator() -> String {
    KEY_SEPARATOR.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            collection: default_collection(),
            separator: default_separator(),
            redis: None,
        }
    }
}

impl StoreConfig {
    /// The key layout described by this config
    pub fn key_layout(&self) -> KeyLayout {
        KeyLayout::new(self.collection.clone(), self.separator.clone())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.is_empty() {
            return Err(ConfigError::Invalid("collection must not be empty".into()));
        }
        if self.separator.is_empty() {
            return Err(ConfigError::Invalid("separator must not be empty".into()));
        }
        if let Some(redis) = &self.redis {
            if redis.url.is_empty() {
                return Err(ConfigError::Invalid("redis.url must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Default file content with comments
    pub fn default_toml() -> &'static str {
        r#"# Device directory configuration
#
# Device table literal. Every key is rooted at it:
#   <collection>:<id>, <collection>:name, <collection>:label:<label>, ...
collection = "md|dv"

# Separator between key parts
separator = ":"

# Redis-compatible substrate. Leave commented out for the in-process store.
# [redis]
# url = "redis://127.0.0.1:6379/0"
"#
    }

    /// Read, parse and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
