#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Representative center points for feature geometries.
//!
//! Reduces a `GeoJSON` `Point`, `Polygon`, or `MultiPolygon` to a single
//! [`CenterPoint`]. Polygon centers are the unweighted mean of the outer
//! ring's vertices, not an area-weighted centroid. Holes and every polygon
//! after the first one in a `MultiPolygon` are ignored.
//!
//! Nothing in this crate panics on malformed input: unusable geometries
//! resolve to `None`.

use airzone_zone_models::CenterPoint;
use geojson::{Geometry, Position, Value};

/// Resolves the center of a decoded geometry.
#[must_use]
pub fn resolve_center(geometry: &Geometry) -> Option<CenterPoint> {
    resolve_center_value(&geometry.value)
}

/// Resolves the center of a geometry value.
///
/// - `Point` `[lng, lat, ..]` → `(lat, lng)`
/// - `Polygon` → mean of the outer ring's vertices
/// - `MultiPolygon` → mean of the first polygon's outer ring
///
/// Any other geometry type resolves to `None`.
#[must_use]
pub fn resolve_center_value(value: &Value) -> Option<CenterPoint> {
    match value {
        Value::Point(position) => point_center(position),
        Value::Polygon(rings) => polygon_center(rings),
        Value::MultiPolygon(polygons) => polygons.first().and_then(|rings| polygon_center(rings)),
        _ => None,
    }
}

/// Resolves the center of a raw `GeoJSON` geometry object.
///
/// Returns `None` for `null`, for objects that do not decode as `GeoJSON`
/// geometry, and for geometries [`resolve_center_value`] rejects.
#[must_use]
pub fn resolve_center_json(geometry: &serde_json::Value) -> Option<CenterPoint> {
    if geometry.is_null() {
        return None;
    }

    match Geometry::from_json_value(geometry.clone()) {
        Ok(decoded) => resolve_center(&decoded),
        Err(e) => {
            log::debug!("Unusable geometry: {e}");
            None
        }
    }
}

fn point_center(position: &Position) -> Option<CenterPoint> {
    let (lng, lat) = lng_lat(position)?;
    finite(CenterPoint::new(lat, lng))
}

fn polygon_center(rings: &[Vec<Position>]) -> Option<CenterPoint> {
    let outer = rings.first()?;
    if outer.is_empty() {
        return None;
    }

    let mut sum_lat = 0.0;
    let mut sum_lng = 0.0;
    for vertex in outer {
        let (lng, lat) = lng_lat(vertex)?;
        sum_lat += lat;
        sum_lng += lng;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = outer.len() as f64;

    finite(CenterPoint::new(sum_lat / n, sum_lng / n))
}

/// Splits a position into `(lng, lat)`; needs at least two components.
fn lng_lat(position: &Position) -> Option<(f64, f64)> {
    match position.as_slice() {
        [lng, lat, ..] => Some((*lng, *lat)),
        _ => None,
    }
}

fn finite(center: CenterPoint) -> Option<CenterPoint> {
    (center.latitude.is_finite() && center.longitude.is_finite()).then_some(center)
}
