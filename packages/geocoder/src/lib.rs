#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for zone center points.
//!
//! Turns a [`CenterPoint`] into an administrative [`AddressInfo`]
//! (province, district, sub-district). Implementations never fail toward
//! the caller: when a point cannot be resolved they return
//! [`AddressInfo::unresolved`], which carries the raw coordinate string.
//!
//! Providers:
//!
//! 1. **VWorld address API** ([`vworld::VworldGeocoder`]): needs an API
//!    key. The caller is responsible for spacing requests.
//! 2. **Null** ([`NullGeocoder`]): never resolves; used when geocoding is
//!    disabled.

pub mod vworld;

use airzone_zone_models::{AddressInfo, CenterPoint};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single geocoding lookup.
///
/// These never escape a [`ReverseGeocoder`]; they are logged and replaced
/// by the placeholder address.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP status {status}")]
    Status {
        /// The returned status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The service answered but had no address for the point.
    #[error("No address found (status: {status})")]
    NotFound {
        /// Status reported by the service.
        status: String,
    },
}

/// Resolves center points to addresses.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Returns the address for `center`, or the placeholder when it
    /// cannot be resolved.
    async fn reverse(&self, center: CenterPoint) -> AddressInfo;
}

/// A geocoder that never resolves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGeocoder;

#[async_trait]
impl ReverseGeocoder for NullGeocoder {
    async fn reverse(&self, center: CenterPoint) -> AddressInfo {
        AddressInfo::unresolved(center)
    }
}
