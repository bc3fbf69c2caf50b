//! VWorld address API reverse geocoder.
//!
//! Calls the `getAddress` endpoint with `type=BOTH` and reads the first
//! result's `structure` block:
//!
//! - `level1`: province / metropolitan city
//! - `level2`: district
//! - `level4A` (falling back to `level4L`): sub-district
//!
//! The service allows a limited number of requests per day; callers are
//! expected to space their calls.
//!
//! See <https://www.vworld.kr/dev/v4dv_geocoderguide2_s002.do>

use std::time::Duration;

use airzone_source_models::Credentials;
use airzone_zone_models::{AddressInfo, CenterPoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GeocodeError, ReverseGeocoder};

/// Default address API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.vworld.kr/req/address";

/// Reverse geocoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Address API endpoint.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Reverse geocoder backed by the VWorld address API.
#[derive(Debug, Clone)]
pub struct VworldGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
    credentials: Credentials,
}

impl VworldGeocoder {
    /// Builds a geocoder with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GeocoderConfig, credentials: Credentials) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Looks up `center`, surfacing every failure.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails, the response cannot
    /// be parsed, or the service has no address for the point.
    pub async fn lookup(&self, center: CenterPoint) -> Result<AddressInfo, GeocodeError> {
        let point = format!("{},{}", center.longitude, center.latitude);
        let mut params = vec![
            ("service", "address"),
            ("request", "getAddress"),
            ("version", "2.0"),
            ("crs", "EPSG:4326"),
            ("type", "BOTH"),
            ("format", "json"),
            ("point", point.as_str()),
            ("key", self.credentials.key.as_str()),
        ];
        if !self.credentials.domain.is_empty() {
            params.push(("domain", self.credentials.domain.as_str()));
        }

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: Value = resp.json().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl ReverseGeocoder for VworldGeocoder {
    async fn reverse(&self, center: CenterPoint) -> AddressInfo {
        match self.lookup(center).await {
            Ok(address) => address,
            Err(GeocodeError::NotFound { status }) => {
                log::debug!("No address for {center} ({status})");
                AddressInfo::unresolved(center)
            }
            Err(e) => {
                log::warn!("Reverse geocoding failed for {center}: {e}");
                AddressInfo::unresolved(center)
            }
        }
    }
}

/// Parses an address API response.
fn parse_response(body: &Value) -> Result<AddressInfo, GeocodeError> {
    let response = body.get("response").ok_or_else(|| GeocodeError::Parse {
        message: "Missing response in address API body".to_string(),
    })?;

    let status = response
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");
    if status != "OK" {
        return Err(GeocodeError::NotFound {
            status: status.to_string(),
        });
    }

    let first = response
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| GeocodeError::NotFound {
            status: "EMPTY_RESULT".to_string(),
        })?;

    let structure = first.get("structure").ok_or_else(|| GeocodeError::Parse {
        message: "Missing structure in address result".to_string(),
    })?;

    let level = |key: &str| {
        structure
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let province = level("level1");
    let district = level("level2");
    let sub_district = level("level4A").or_else(|| level("level4L"));

    let formatted = first
        .get("text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(
            || {
                [&province, &district, &sub_district]
                    .into_iter()
                    .flatten()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            },
            String::from,
        );

    Ok(AddressInfo {
        province,
        district,
        sub_district,
        formatted,
        resolved: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_address_result() {
        let body = serde_json::json!({
            "response": {
                "status": "OK",
                "result": [{
                    "type": "parcel",
                    "text": "서울특별시 용산구 용산동3가 1-1",
                    "structure": {
                        "level0": "대한민국",
                        "level1": "서울특별시",
                        "level2": "용산구",
                        "level3": "",
                        "level4L": "",
                        "level4A": "용산동3가",
                        "level5": "1-1"
                    }
                }]
            }
        });
        let address = parse_response(&body).unwrap();
        assert!(address.resolved);
        assert_eq!(address.province.as_deref(), Some("서울특별시"));
        assert_eq!(address.resolved_district(), Some("용산구"));
        assert_eq!(address.sub_district.as_deref(), Some("용산동3가"));
        assert_eq!(address.formatted, "서울특별시 용산구 용산동3가 1-1");
    }

    #[test]
    fn falls_back_to_road_level_and_builds_text() {
        let body = serde_json::json!({
            "response": {
                "status": "OK",
                "result": [{
                    "structure": {"level1": "경기도", "level2": "성남시 분당구", "level4L": "판교역로"}
                }]
            }
        });
        let address = parse_response(&body).unwrap();
        assert_eq!(address.sub_district.as_deref(), Some("판교역로"));
        assert_eq!(address.formatted, "경기도 성남시 분당구 판교역로");
    }

    #[test]
    fn not_found_status_is_reported() {
        let body = serde_json::json!({"response": {"status": "NOT_FOUND"}});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::NotFound { status }) if status == "NOT_FOUND"
        ));
    }

    #[test]
    fn missing_envelope_is_parse_error() {
        assert!(matches!(
            parse_response(&serde_json::json!([])),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
