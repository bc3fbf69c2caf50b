#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate statistics over classified zones.
//!
//! [`aggregate`] folds a run's zones into three independent tallies: by
//! category type, by severity tier, and by resolved district. Zones
//! without a resolved address are left out of the district tally only.

use airzone_zone_models::{Summary, Zone};
use serde::{Deserialize, Serialize};

/// Folds `zones` into a [`Summary`].
///
/// The result does not depend on the order of `zones`.
#[must_use]
pub fn aggregate(zones: &[Zone]) -> Summary {
    let mut summary = Summary::empty();

    for zone in zones {
        summary.total += 1;

        *summary
            .by_type
            .entry(zone.category.type_name.to_string())
            .or_insert(0) += 1;

        *summary
            .by_severity
            .entry(zone.category.severity)
            .or_insert(0) += 1;

        if let Some(district) = zone.address.as_ref().and_then(|a| a.resolved_district()) {
            *summary.by_district.entry(district.to_string()).or_insert(0) += 1;
        }
    }

    log::debug!(
        "Aggregated {} zones into {} types and {} districts",
        summary.total,
        summary.by_type.len(),
        summary.by_district.len()
    );

    summary
}

/// One named count, used for ranked listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedCount {
    /// Type name or district name.
    pub name: String,
    /// Number of zones.
    pub count: u64,
}

/// Returns the district tally ordered by count (descending), then name.
#[must_use]
pub fn ranked_districts(summary: &Summary, limit: Option<usize>) -> Vec<NamedCount> {
    ranked(&summary.by_district, limit)
}

/// Returns the type tally ordered by count (descending), then name.
#[must_use]
pub fn ranked_types(summary: &Summary) -> Vec<NamedCount> {
    ranked(&summary.by_type, None)
}

fn ranked(
    counts: &std::collections::BTreeMap<String, u64>,
    limit: Option<usize>,
) -> Vec<NamedCount> {
    let mut rows: Vec<NamedCount> = counts
        .iter()
        .map(|(name, count)| NamedCount {
            name: name.clone(),
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

#[cfg(test)]
mod tests {
    use airzone_zone_models::{
        AddressInfo, CenterPoint, RestrictionCategory, RestrictionKind, Severity,
    };

    use super::*;

    fn zone(kind: RestrictionKind, district: Option<&str>, resolved: bool) -> Zone {
        let center = CenterPoint::new(37.5, 127.0);
        let address = district.map(|d| AddressInfo {
            province: Some("서울특별시".to_string()),
            district: Some(d.to_string()),
            sub_district: None,
            formatted: format!("서울특별시 {d}"),
            resolved,
        });
        Zone {
            feature_id: None,
            name: String::new(),
            description: None,
            altitude_limit: None,
            center: Some(center),
            category: RestrictionCategory::new(kind, "test", Vec::new()),
            address,
        }
    }

    fn sample() -> Vec<Zone> {
        vec![
            zone(RestrictionKind::NoFly, Some("용산구"), true),
            zone(RestrictionKind::NoFly, Some("종로구"), true),
            zone(RestrictionKind::ControlZone, Some("강서구"), true),
            zone(RestrictionKind::Alert, None, false),
            zone(RestrictionKind::Danger, Some("placeholder"), false),
            zone(RestrictionKind::Restricted, Some("용산구"), true),
        ]
    }

    #[test]
    fn totals_match_zone_count() {
        let zones = sample();
        let summary = aggregate(&zones);
        let n = zones.len() as u64;

        assert_eq!(summary.total, n);
        assert_eq!(summary.by_type.values().sum::<u64>(), n);
        assert_eq!(summary.by_severity.values().sum::<u64>(), n);
        assert!(summary.by_district.values().sum::<u64>() <= n);
    }

    #[test]
    fn counts_by_type_and_severity() {
        let summary = aggregate(&sample());
        assert_eq!(summary.by_type["비행금지구역"], 2);
        assert_eq!(summary.by_type["관제권"], 1);
        assert_eq!(summary.severity_count(Severity::High), 3);
        assert_eq!(summary.severity_count(Severity::Medium), 2);
        assert_eq!(summary.severity_count(Severity::Low), 1);
    }

    #[test]
    fn unresolved_addresses_are_excluded_from_districts() {
        let summary = aggregate(&sample());
        assert_eq!(summary.by_district.len(), 3);
        assert_eq!(summary.by_district["용산구"], 2);
        assert!(!summary.by_district.contains_key("placeholder"));
    }

    #[test]
    fn empty_input_keeps_every_tier() {
        let summary = aggregate(&[]);
        assert_eq!(summary, Summary::empty());
        for severity in Severity::all() {
            assert_eq!(summary.by_severity.get(severity), Some(&0));
        }
    }

    #[test]
    fn order_does_not_matter() {
        let zones = sample();
        let mut reversed = zones.clone();
        reversed.reverse();
        assert_eq!(aggregate(&zones), aggregate(&reversed));
    }

    #[test]
    fn ranks_districts_by_count_then_name() {
        let summary = aggregate(&sample());
        let ranked = ranked_districts(&summary, Some(2));
        assert_eq!(
            ranked,
            vec![
                NamedCount {
                    name: "용산구".to_string(),
                    count: 2
                },
                NamedCount {
                    name: "강서구".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(ranked_types(&summary)[0].name, "비행금지구역");
    }

    #[test]
    fn summary_serializes_severity_keys_lowercase() {
        let json = serde_json::to_value(aggregate(&sample())).unwrap();
        assert_eq!(json["bySeverity"]["high"], 3);
        assert_eq!(json["bySeverity"]["low"], 1);
    }
}
