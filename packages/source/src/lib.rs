#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Airspace feature fetching and restriction classification.
//!
//! A [`FeatureSource`] retrieves raw `GeoJSON` features for a
//! [`FeatureQuery`]; [`vworld::VworldFetcher`] is the implementation for
//! the VWorld data API. [`classify::classify`] maps a feature's properties
//! to the canonical restriction taxonomy.

pub mod classify;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod vworld;

use airzone_source_models::FeatureQuery;
use async_trait::async_trait;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP client could not be built or a request could not be made.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt failed at the transport or HTTP status level.
    #[error("request failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// The last failure.
        message: String,
    },

    /// The response did not have the expected shape. Not retried.
    #[error("unexpected response structure: {message}")]
    Structure {
        /// Description of what was missing.
        message: String,
    },

    /// The query carried no API key.
    #[error("missing API credentials")]
    MissingCredentials,
}

/// A provider of raw airspace features.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Returns a short name for log messages.
    fn name(&self) -> &str;

    /// Fetches every raw feature matching `query`, in upstream order.
    ///
    /// An empty vector means the query area has no features.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the features could not be retrieved.
    async fn fetch(&self, query: &FeatureQuery) -> Result<Vec<serde_json::Value>, SourceError>;
}
