//! Per-document configuration.

use serde::{Deserialize, Serialize};

use crate::core::log::DEFAULT_LOG_CAPACITY;

/// Settings fixed for the lifetime of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Most operations the document's log will accept.
    pub log_capacity: usize,
    /// Emit one `info` event per rendered operation, carrying its JSON.
    pub verbose_render: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            verbose_render: false,
        }
    }
}

/// Rejected configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A log that can hold nothing.
    #[error("log_capacity must be at least 1")]
    ZeroCapacity,
    /// Unparseable JSON.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentConfig {
    /// Checks invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Parses a (possibly partial) JSON object; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
