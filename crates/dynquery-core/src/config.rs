//! Engine configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Default upper bound on `pageSize` accepted by request validation.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Default number of resolved field paths kept by an engine-owned cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

fn default_max_page_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Query engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Capacity of the accessor-chain cache when the engine owns one.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Resolve through the process-wide cache instead of an engine-owned one.
    #[serde(default)]
    pub shared_cache: bool,
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            shared_cache: false,
        }
    }

    /// Parse a configuration from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the maximum page size.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    /// Set the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    /// Use the process-wide accessor-chain cache.
    pub fn with_shared_cache(mut self) -> Self {
        self.shared_cache = true;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(!config.shared_cache);
    }

    #[test]
    fn test_builders_clamp_to_one() {
        let config = EngineConfig::new()
            .with_max_page_size(0)
            .with_cache_capacity(0)
            .with_shared_cache();
        assert_eq!(config.max_page_size, 1);
        assert_eq!(config.cache_capacity, 1);
        assert!(config.shared_cache);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"maxPageSize": 25}"#).unwrap();
        assert_eq!(config, EngineConfig::new().with_max_page_size(25));

        let empty = EngineConfig::from_json("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = EngineConfig::from_json(r#"{"pageLimit": 5}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/dynquery/engine.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
