use serde::{Deserialize, Serialize};
use strand_types::SearchBounds;
use thiserror::Error;

/// Default capacity of a handle's watch failure channel.
pub const DEFAULT_WATCH_FAILURE_CAPACITY: usize = 64;

/// Per-handle settings. Every field has a default, so a partial TOML
/// document is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bounds used by [`Store::merge`](crate::Store::merge).
    pub merge_bounds: SearchBounds,
    /// Bounds used by [`Store::lcas`](crate::Store::lcas).
    pub lca_bounds: SearchBounds,
    /// Bounds used by [`Store::fast_forward_head`](crate::Store::fast_forward_head).
    pub fast_forward_bounds: SearchBounds,
    /// How many unread failure reports a watch subscriber may lag behind.
    pub watch_failure_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            merge_bounds: SearchBounds::unbounded(),
            lca_bounds: SearchBounds::unbounded(),
            fast_forward_bounds: SearchBounds::unbounded(),
            watch_failure_capacity: DEFAULT_WATCH_FAILURE_CAPACITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("watch_failure_capacity must be at least 1")]
    ZeroCapacity,
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(s)?;
        if config.watch_failure_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(config)
    }
}
