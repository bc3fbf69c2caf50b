#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream query descriptors and airspace dataset definitions.
//!
//! A [`FeatureQuery`] is the fixed description of one upstream request:
//! which dataset, which bounding box, which response format, and the
//! caller-supplied [`Credentials`]. Dataset definitions are deserialized
//! from the TOML files embedded by the source registry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default coordinate reference system for queries.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Default page size requested from the data API (its maximum).
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// A geographic query box given by two opposite corners, in
/// `(longitude, latitude)` order.
///
/// Corner order is preserved when rendered so the upstream filter string
/// matches what the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Longitude of the first corner.
    pub lng1: f64,
    /// Latitude of the first corner.
    pub lat1: f64,
    /// Longitude of the second corner.
    pub lng2: f64,
    /// Latitude of the second corner.
    pub lat2: f64,
}

impl BoundingBox {
    /// Seoul metropolitan area.
    pub const SEOUL_METRO: Self = Self {
        lng1: 126.734_086,
        lat1: 37.715_133,
        lng2: 127.269_311,
        lat2: 37.413_294,
    };

    /// Renders the box as the upstream `geomFilter` value.
    #[must_use]
    pub fn to_geom_filter(&self) -> String {
        format!(
            "BOX({},{},{},{})",
            self.lng1, self.lat1, self.lng2, self.lat2
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SEOUL_METRO
    }
}

/// Error returned when a bounding box string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bounding box '{input}': {reason}")]
pub struct BoundingBoxParseError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxParseError;

    /// Parses `BOX(x1,y1,x2,y2)` or bare `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| BoundingBoxParseError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix("BOX(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let values = inner
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| err("expected numeric coordinates"))?;

        let &[lng1, lat1, lng2, lat2] = values.as_slice() else {
            return Err(err("expected exactly four coordinates"));
        };

        if [lng1, lat1, lng2, lat2].iter().any(|v| !v.is_finite()) {
            return Err(err("coordinates must be finite"));
        }

        Ok(Self {
            lng1,
            lat1,
            lng2,
            lat2,
        })
    }
}

/// Caller-supplied API credentials.
///
/// Only checked for presence; the upstream service validates them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// API key.
    pub key: String,
    /// Domain the key is registered to.
    #[serde(default)]
    pub domain: String,
}

impl Credentials {
    /// Creates credentials from a key and registered domain.
    #[must_use]
    pub fn new(key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            domain: domain.into(),
        }
    }

    /// Returns `true` when a non-blank key is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// One upstream feature request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuery {
    /// Dataset identifier (e.g. `"LT_C_AISPRHC"`).
    pub dataset: String,
    /// Query area.
    pub bbox: BoundingBox,
    /// Coordinate reference system of the response geometries.
    pub crs: String,
    /// Response format requested from the API.
    pub format: String,
    /// Page size.
    pub size: u32,
    /// 1-based page number.
    pub page: u32,
    /// API credentials.
    pub credentials: Credentials,
}

impl FeatureQuery {
    /// Creates a JSON query for `dataset` inside `bbox`.
    #[must_use]
    pub fn new(dataset: impl Into<String>, bbox: BoundingBox, credentials: Credentials) -> Self {
        Self {
            dataset: dataset.into(),
            bbox,
            crs: DEFAULT_CRS.to_string(),
            format: "json".to_string(),
            size: DEFAULT_PAGE_SIZE,
            page: 1,
            credentials,
        }
    }

    /// Returns the query-string parameters for the data API `GetFeature`
    /// request.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("service", "data".to_string()),
            ("request", "GetFeature".to_string()),
            ("data", self.dataset.clone()),
            ("key", self.credentials.key.clone()),
            ("geomFilter", self.bbox.to_geom_filter()),
            ("crs", self.crs.clone()),
            ("format", self.format.clone()),
            ("size", self.size.to_string()),
            ("page", self.page.to_string()),
        ];
        if !self.credentials.domain.is_empty() {
            params.push(("domain", self.credentials.domain.clone()));
        }
        params
    }
}

/// An airspace dataset published by the data API, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Short identifier (e.g. `"prohibited"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Upstream dataset code (e.g. `"LT_C_AISPRHC"`).
    pub dataset: String,
    /// Whether the dataset is fetched by default.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}
