//! Publisher configuration
//!
//! Loaded from JSON, either a standalone file or the `config` object of a
//! pipeline node. Missing keys take their defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Port a fresh publisher binds to
pub const DEFAULT_PORT: u16 = 3335;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// TCP port of the PUB socket, bound on all interfaces
    pub port: u16,
    /// Comma-separated channel indices, or `*` for all
    pub channels: String,
    /// Sample rate reported for blocks without channel metadata
    pub fallback_sample_rate: f32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            channels: "*".to_string(),
            fallback_sample_rate: 30000.0,
        }
    }
}

impl PublisherConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn from_value(config: Value) -> Result<Self> {
        if config.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(config)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PublisherConfig::default();
        assert_eq!(config.port, 3335);
        assert_eq!(config.channels, "*");
    }

    #[test]
    fn test_partial_value_uses_defaults() {
        let config = PublisherConfig::from_value(serde_json::json!({"port": 5555})).unwrap();
        assert_eq!(config.port, 5555);
        assert_eq!(config.channels, "*");
        assert_eq!(config.fallback_sample_rate, 30000.0);
    }

    #[test]
    fn test_null_value_is_default() {
        let config = PublisherConfig::from_value(Value::Null).unwrap();
        assert_eq!(config, PublisherConfig::default());
    }
}
