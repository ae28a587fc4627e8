//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::error::{EngineError, Result};
use crate::metrics::DEFAULT_BUFFER_CAPACITY;

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_performance_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long a cached result stays valid
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum cached results before the oldest is evicted
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_performance_buffer_capacity")]
    pub performance_buffer_capacity: usize,

    /// Seeds the engine's RNG for Monte Carlo calls without their own seed.
    /// When unset the RNG is seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            performance_buffer_capacity: default_performance_buffer_capacity(),
            seed: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The TTL has whole-second resolution; a fractional second rounds up
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        self
    }

    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_performance_buffer_capacity(mut self, capacity: usize) -> Self {
        self.performance_buffer_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            return Err(EngineError::invalid(
                "cache_ttl_secs",
                "must be greater than zero",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(EngineError::invalid(
                "cache_capacity",
                "must be greater than zero",
            ));
        }
        if self.performance_buffer_capacity == 0 {
            return Err(EngineError::invalid(
                "performance_buffer_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.performance_buffer_capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config, EngineConfig::default().with_seed(7));
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let config = EngineConfig::new().with_cache_ttl(Duration::from_millis(500));
        assert_eq!(config.cache_ttl(), Duration::from_secs(1));
        assert!(config.validate().is_ok());

        let config = EngineConfig::new().with_cache_ttl(Duration::from_millis(2_250));
        assert_eq!(config.cache_ttl_secs, 3);

        let config = EngineConfig::new().with_cache_ttl(Duration::ZERO);
        assert_eq!(config.validate().unwrap_err().field(), Some("cache_ttl_secs"));
    }

    #[test]
    fn test_builder_and_validation() {
        let config = EngineConfig::new()
            .with_cache_ttl(Duration::from_secs(60))
            .with_cache_capacity(0);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.validate().unwrap_err().field(), Some("cache_capacity"));
    }
}
