//! File-based settings.
//!
//! Every section and every key is optional; anything left out keeps its
//! default:
//!
//! ```toml
//! [fetch]
//! timeout_ms = 10000
//! max_attempts = 3
//! retry_delay_ms = 5000
//!
//! [geocoder]
//! timeout_ms = 5000
//!
//! [pipeline]
//! geocode_delay_ms = 1000
//! ```

use std::path::Path;

use airzone_geocoder::vworld::GeocoderConfig;
use airzone_source::vworld::FetchConfig;
use serde::{Deserialize, Serialize};

use crate::PipelineOptions;

/// Errors loading an [`AirzoneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that was read.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The contents are not valid TOML for this shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the fetcher, the geocoder, and the run loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirzoneConfig {
    /// Data API fetcher settings.
    pub fetch: FetchConfig,
    /// Reverse geocoder settings.
    pub geocoder: GeocoderConfig,
    /// Run loop settings.
    pub pipeline: PipelineOptions,
}

impl AirzoneConfig {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or a
    /// key has the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a TOML settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
