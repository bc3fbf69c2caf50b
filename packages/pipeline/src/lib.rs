#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end airspace zone pipeline.
//!
//! [`run`] fetches raw features for one query, then for each feature in
//! upstream order: decodes it, resolves a center point, reverse-geocodes
//! the center (spacing calls by [`PipelineOptions::geocode_delay_ms`]),
//! classifies the properties, and assembles a [`Zone`]. The summary is
//! computed once over the final zone list.
//!
//! A run never fails as a whole. A failed fetch yields no zones and an
//! all-zero summary; a feature that cannot be decoded is skipped.

pub mod config;

use std::sync::Arc;
use std::time::{Duration, Instant};

use airzone_geocoder::ReverseGeocoder;
use airzone_source::FeatureSource;
use airzone_source::classify::classify;
use airzone_source::progress::ProgressCallback;
use airzone_source_models::FeatureQuery;
use airzone_zone_models::{AddressInfo, CenterPoint, Summary, Zone, ZoneProperties};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default spacing between reverse-geocoding calls.
pub const DEFAULT_GEOCODE_DELAY_MS: u64 = 1_000;

/// Errors for a single feature. Logged and skipped by [`run`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The feature is not a JSON object.
    #[error("feature is not an object: {message}")]
    Feature {
        /// What was found instead.
        message: String,
    },

    /// The feature's `properties` member is not an object.
    #[error("feature properties are not an object: {message}")]
    Properties {
        /// What was found instead.
        message: String,
    },

    /// The feature's properties could not be decoded.
    #[error("invalid feature properties: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-run options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Pause after every reverse-geocoding call, in milliseconds.
    pub geocode_delay_ms: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            geocode_delay_ms: DEFAULT_GEOCODE_DELAY_MS,
        }
    }
}

impl PipelineOptions {
    /// Pause after every reverse-geocoding call.
    #[must_use]
    pub const fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Zones in upstream feature order.
    pub zones: Vec<Zone>,
    /// Tallies over `zones`.
    pub summary: Summary,
}

impl PipelineOutput {
    /// Output of a run that produced nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            zones: Vec::new(),
            summary: Summary::empty(),
        }
    }
}

/// A feature decoded into the fields the pipeline reads.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFeature {
    /// Upstream `id`, if any.
    pub feature_id: Option<String>,
    /// Typed attribute fields.
    pub properties: ZoneProperties,
    /// Representative point, `None` for unusable geometry.
    pub center: Option<CenterPoint>,
}

/// Decodes one raw `GeoJSON` feature.
///
/// Missing or null `properties` decode to empty properties. Missing or
/// malformed geometry decodes to `center: None`.
///
/// # Errors
///
/// * [`PipelineError::Feature`] if `feature` is not a JSON object
/// * [`PipelineError::Properties`] if `properties` is neither null nor an
///   object
/// * [`PipelineError::Json`] if a property has an unsupported shape
pub fn decode_feature(feature: &Value) -> Result<DecodedFeature, PipelineError> {
    let Some(object) = feature.as_object() else {
        return Err(PipelineError::Feature {
            message: json_kind(feature).to_string(),
        });
    };

    let properties = match object.get("properties") {
        None | Some(Value::Null) => ZoneProperties::default(),
        Some(value @ Value::Object(_)) => ZoneProperties::deserialize(value)?,
        Some(other) => {
            return Err(PipelineError::Properties {
                message: json_kind(other).to_string(),
            });
        }
    };

    let feature_id = match object.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let center = object
        .get("geometry")
        .and_then(airzone_spatial::resolve_center_json);

    Ok(DecodedFeature {
        feature_id,
        properties,
        center,
    })
}

/// Classifies a decoded feature and assembles its [`Zone`].
#[must_use]
pub fn assemble_zone(feature: DecodedFeature, address: Option<AddressInfo>) -> Zone {
    let category = classify(&feature.properties);
    let name = feature.properties.display_name();
    let DecodedFeature {
        feature_id,
        properties,
        center,
    } = feature;

    Zone {
        feature_id,
        name,
        description: properties.rmk,
        altitude_limit: properties.alt_lmt,
        center,
        category,
        address,
    }
}

/// Runs the whole pipeline for `query`.
///
/// Features are processed one at a time, in order. Every geocoding call is
/// followed by `options.geocode_delay()`, including calls that returned
/// the placeholder address.
pub async fn run(
    source: &dyn FeatureSource,
    geocoder: &dyn ReverseGeocoder,
    query: &FeatureQuery,
    options: &PipelineOptions,
    progress: Arc<dyn ProgressCallback>,
) -> PipelineOutput {
    let start = Instant::now();
    log::info!(
        "{}: fetching {} ({})",
        source.name(),
        query.dataset,
        query.bbox.to_geom_filter()
    );

    let features = match source.fetch(query).await {
        Ok(features) => features,
        Err(e) => {
            log::error!("{}: fetch failed for {}: {e}", source.name(), query.dataset);
            progress.finish(format!("{}: fetch failed", query.dataset));
            return PipelineOutput::empty();
        }
    };

    log::info!("{}: {} features fetched", source.name(), features.len());
    progress.set_total(features.len() as u64);

    let mut zones = Vec::with_capacity(features.len());
    let mut skipped: u64 = 0;
    let mut geocoded: u64 = 0;

    for (index, raw) in features.iter().enumerate() {
        let feature = match decode_feature(raw) {
            Ok(feature) => feature,
            Err(e) => {
                log::warn!("{}: skipping feature {index}: {e}", query.dataset);
                skipped += 1;
                progress.inc(1);
                continue;
            }
        };

        progress.set_message(feature.properties.display_name());

        let address = match feature.center {
            Some(center) => {
                let address = geocoder.reverse(center).await;
                geocoded += 1;
                tokio::time::sleep(options.geocode_delay()).await;
                Some(address)
            }
            None => {
                log::debug!("{}: feature {index} has no usable geometry", query.dataset);
                None
            }
        };

        zones.push(assemble_zone(feature, address));
        progress.inc(1);
    }

    let summary = airzone_analytics::aggregate(&zones);

    progress.finish(format!("{}: {} zones", query.dataset, zones.len()));
    log::info!(
        "{}: {} zones ({skipped} skipped, {geocoded} geocoded), took {:.1}s",
        query.dataset,
        zones.len(),
        start.elapsed().as_secs_f64()
    );

    PipelineOutput { zones, summary }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use airzone_geocoder::NullGeocoder;
    use airzone_source::SourceError;
    use airzone_source::progress::null_progress;
    use airzone_source_models::{BoundingBox, Credentials};
    use airzone_zone_models::{RestrictionKind, Severity};
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct StaticSource(Vec<Value>);

    #[async_trait]
    impl FeatureSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _query: &FeatureQuery) -> Result<Vec<Value>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl FeatureSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _query: &FeatureQuery) -> Result<Vec<Value>, SourceError> {
            Err(SourceError::RetriesExhausted {
                attempts: 3,
                message: "HTTP 500".to_string(),
            })
        }
    }

    /// Resolves every point to the same district and records the calls.
    #[derive(Default)]
    struct RecordingGeocoder {
        calls: Mutex<Vec<CenterPoint>>,
    }

    #[async_trait]
    impl ReverseGeocoder for RecordingGeocoder {
        async fn reverse(&self, center: CenterPoint) -> AddressInfo {
            self.calls.lock().unwrap().push(center);
            AddressInfo {
                province: Some("서울특별시".to_string()),
                district: Some("송파구".to_string()),
                sub_district: None,
                formatted: "서울특별시 송파구".to_string(),
                resolved: true,
            }
        }
    }

    fn query() -> FeatureQuery {
        FeatureQuery::new(
            "LT_C_AISPRHC",
            BoundingBox::SEOUL_METRO,
            Credentials::new("key", ""),
        )
    }

    fn no_delay() -> PipelineOptions {
        PipelineOptions {
            geocode_delay_ms: 0,
        }
    }

    fn triangle(label: &str) -> Value {
        json!({
            "type": "Feature",
            "id": "LT_C_AISPRHC.1",
            "geometry": {"type": "Polygon", "coordinates": [[[127.0, 37.5], [127.2, 37.5], [127.1, 37.6]]]},
            "properties": {"prh_lbl_1": label, "prh_nam": "P-73A", "alt_lmt": "GND~UNL"}
        })
    }

    #[test]
    fn decodes_id_properties_and_center() {
        let feature = decode_feature(&triangle("비행금지구역")).unwrap();
        assert_eq!(feature.feature_id.as_deref(), Some("LT_C_AISPRHC.1"));
        assert_eq!(feature.properties.prh_lbl_1.as_deref(), Some("비행금지구역"));
        let center = feature.center.unwrap();
        assert!((center.latitude - 37.533_333).abs() < 1e-4);
        assert!((center.longitude - 127.1).abs() < 1e-9);
    }

    #[test]
    fn numeric_ids_are_kept() {
        let feature = decode_feature(&json!({"id": 42, "properties": null})).unwrap();
        assert_eq!(feature.feature_id.as_deref(), Some("42"));
        assert_eq!(feature.properties, ZoneProperties::default());
        assert!(feature.center.is_none());
    }

    #[test]
    fn non_object_features_are_rejected() {
        assert!(matches!(
            decode_feature(&json!("oops")),
            Err(PipelineError::Feature { message }) if message == "string"
        ));
        assert!(matches!(
            decode_feature(&json!({"properties": [1, 2]})),
            Err(PipelineError::Properties { message }) if message == "array"
        ));
    }

    #[test]
    fn positional_properties_are_not_decoded_as_fields() {
        let feature = json!({"properties": ["R-75", "x", "y", "z", "w", "1"]});
        assert!(matches!(
            decode_feature(&feature),
            Err(PipelineError::Properties { .. })
        ));
        assert!(matches!(
            decode_feature(&json!({"properties": "비행금지"})),
            Err(PipelineError::Properties { message }) if message == "string"
        ));
    }

    #[test]
    fn nested_property_values_are_rejected() {
        assert!(matches!(
            decode_feature(&json!({"properties": {"prh_typ": {"code": "R-75"}}})),
            Err(PipelineError::Json(_))
        ));
    }

    #[tokio::test]
    async fn array_properties_are_skipped_by_run() {
        let source = StaticSource(vec![
            json!({"properties": ["R-75", "x", "y", "z", "w", "1"]}),
            triangle("금지"),
        ]);

        let output = run(&source, &NullGeocoder, &query(), &no_delay(), null_progress()).await;

        assert_eq!(output.zones.len(), 1);
        assert_eq!(output.zones[0].category.kind, RestrictionKind::NoFly);
        assert!(!output.summary.by_type.contains_key("비행제한구역"));
    }

    #[test]
    fn assembles_zone_fields() {
        let feature = decode_feature(&json!({
            "geometry": {"type": "Point", "coordinates": [126.9, 37.55]},
            "properties": {"prh_typ": "관제권", "rmk": "김포 관제권", "alt_lmt": "3000ft"}
        }))
        .unwrap();
        let zone = assemble_zone(feature, None);
        assert_eq!(zone.name, "");
        assert_eq!(zone.description.as_deref(), Some("김포 관제권"));
        assert_eq!(zone.altitude_limit.as_deref(), Some("3000ft"));
        assert_eq!(zone.center, Some(CenterPoint::new(37.55, 126.9)));
        assert_eq!(zone.category.kind, RestrictionKind::ControlZone);
    }

    #[tokio::test]
    async fn triangle_with_prohibited_label_is_no_fly() {
        let source = StaticSource(vec![triangle("금지")]);
        let geocoder = RecordingGeocoder::default();

        let output = run(&source, &geocoder, &query(), &no_delay(), null_progress()).await;

        assert_eq!(output.zones.len(), 1);
        let zone = &output.zones[0];
        assert_eq!(zone.category.kind, RestrictionKind::NoFly);
        assert_eq!(zone.category.severity, Severity::High);
        let center = zone.center.unwrap();
        assert!((center.latitude - 37.5333).abs() < 1e-3);
        assert!((center.longitude - 127.1).abs() < 1e-9);
        assert_eq!(geocoder.calls.lock().unwrap().len(), 1);
        assert_eq!(output.summary.by_district["송파구"], 1);
    }

    #[tokio::test]
    async fn empty_coordinates_skip_geocoding_but_are_counted() {
        let source = StaticSource(vec![
            json!({
                "geometry": {"type": "Polygon", "coordinates": []},
                "properties": {"prh_lbl_1": "R-75 비행제한"}
            }),
            triangle("금지"),
        ]);
        let geocoder = RecordingGeocoder::default();

        let output = run(&source, &geocoder, &query(), &no_delay(), null_progress()).await;

        assert_eq!(output.zones.len(), 2);
        assert!(output.zones[0].center.is_none());
        assert!(output.zones[0].address.is_none());
        assert_eq!(geocoder.calls.lock().unwrap().len(), 1);

        let summary = &output.summary;
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_type["비행제한구역"], 1);
        assert_eq!(summary.severity_count(Severity::High), 2);
        assert_eq!(summary.by_district.values().sum::<u64>(), 1);
    }

    #[tokio::test]
    async fn undecodable_features_are_skipped() {
        let source = StaticSource(vec![json!(null), triangle("금지"), json!([1])]);

        let output = run(&source, &NullGeocoder, &query(), &no_delay(), null_progress()).await;

        assert_eq!(output.zones.len(), 1);
        assert_eq!(output.summary.total, 1);
        assert!(output.summary.by_district.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_yields_empty_output() {
        let output = run(
            &FailingSource,
            &NullGeocoder,
            &query(),
            &no_delay(),
            null_progress(),
        )
        .await;
        assert_eq!(output, PipelineOutput::empty());
    }

    #[tokio::test]
    async fn zones_keep_upstream_order() {
        let source = StaticSource(vec![
            triangle("D-1 위험"),
            triangle("A-2 경계"),
            triangle("UA-3"),
        ]);

        let output = run(&source, &NullGeocoder, &query(), &no_delay(), null_progress()).await;

        let kinds: Vec<RestrictionKind> = output.zones.iter().map(|z| z.category.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RestrictionKind::Danger,
                RestrictionKind::Alert,
                RestrictionKind::UltralightCorridor,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn geocode_calls_are_spaced() {
        let source = StaticSource(vec![triangle("금지"), triangle("금지"), json!({})]);
        let options = PipelineOptions::default();

        let start = tokio::time::Instant::now();
        let output = run(&source, &NullGeocoder, &query(), &options, null_progress()).await;

        assert_eq!(output.zones.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(2 * DEFAULT_GEOCODE_DELAY_MS));
        assert!(start.elapsed() < Duration::from_millis(3 * DEFAULT_GEOCODE_DELAY_MS));
    }
}
