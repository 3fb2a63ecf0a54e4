//! Codec configuration.
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! [encoder]
//! block_size = 100
//!
//! [decoder]
//! max_bytes_len = 67108864
//! max_collection_len = 1048576
//! max_depth = 128
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("invalid configuration: {0}")]
    Parse(String),
    #[error("`{key}` must be {requirement}")]
    Invalid {
        key: &'static str,
        requirement: &'static str,
    },
}

/// Encoder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Maximum items per array/map block. `None` writes each collection
    /// as a single block.
    pub block_size: Option<usize>,
}

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    /// Largest accepted bytes/string payload (default: 64 MiB).
    #[serde(default = "default_max_bytes_len")]
    pub max_bytes_len: usize,

    /// Largest accepted array/map item count (default: 16 Mi).
    #[serde(default = "default_max_collection_len")]
    pub max_collection_len: usize,

    /// Deepest accepted nesting of composite values (default: 128).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_bytes_len() -> usize {
    64 * 1024 * 1024
}

fn default_max_collection_len() -> usize {
    16 * 1024 * 1024
}

fn default_max_depth() -> usize {
    128
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_bytes_len: default_max_bytes_len(),
            max_collection_len: default_max_collection_len(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub encoder: EncoderConfig,
    pub decoder: DecoderConfig,
}

impl CodecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded codec config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.block_size == Some(0) {
            return Err(ConfigError::Invalid {
                key: "encoder.block_size",
                requirement: "greater than zero",
            });
        }
        if self.decoder.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "decoder.max_depth",
                requirement: "greater than zero",
            });
        }
        Ok(())
    }
}
