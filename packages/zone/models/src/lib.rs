#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Airspace restriction taxonomy, zone records, and summary types.
//!
//! This crate defines the canonical restriction taxonomy used across the
//! whole airzone workspace. Every feature fetched from the upstream data
//! API is classified into one [`RestrictionKind`], wrapped in a
//! [`RestrictionCategory`] carrying its display metadata, and assembled
//! into a [`Zone`]. A run's zones fold into a [`Summary`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Coarse risk ranking attached to a restriction category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Flight is forbidden or requires special approval.
    High,
    /// Flight requires coordination with the controlling authority.
    Medium,
    /// Flight is allowed with caution.
    Low,
}

impl Severity {
    /// Returns all tiers, highest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// How a zone boundary should be stroked by presentation layers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BorderStyle {
    /// Continuous line.
    Solid,
    /// Long dashes.
    Dashed,
    /// Short dots.
    Dotted,
}

/// Display metadata attached to every restriction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStyle {
    /// Fill/stroke color as a `#rrggbb` hex string.
    pub color: &'static str,
    /// Icon identifier (Font Awesome name).
    pub icon: &'static str,
    /// Boundary stroke style.
    pub border_style: BorderStyle,
    /// Human-readable explanation of why the zone is restricted.
    pub rationale: &'static str,
}

/// The airspace restriction taxonomy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RestrictionKind {
    /// Prohibited area (P-xx). Also the conservative default.
    NoFly,
    /// Restricted area (R-xx).
    Restricted,
    /// Aerodrome control zone.
    ControlZone,
    /// Danger area (D-xx).
    Danger,
    /// Alert area (A-xx).
    Alert,
    /// Ultralight vehicle flying corridor (UA-xx).
    UltralightCorridor,
}

impl RestrictionKind {
    /// Returns the Korean display label used as the category `type_name`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoFly => "비행금지구역",
            Self::Restricted => "비행제한구역",
            Self::ControlZone => "관제권",
            Self::Danger => "위험구역",
            Self::Alert => "경계구역",
            Self::UltralightCorridor => "초경량비행장치 비행구역",
        }
    }

    /// Returns the severity tier for this kind.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::NoFly | Self::Restricted => Severity::High,
            Self::ControlZone | Self::Danger => Severity::Medium,
            Self::Alert | Self::UltralightCorridor => Severity::Low,
        }
    }

    /// Returns the fixed display metadata for this kind.
    #[must_use]
    pub const fn style(self) -> DisplayStyle {
        match self {
            Self::NoFly => DisplayStyle {
                color: "#d32f2f",
                icon: "ban",
                border_style: BorderStyle::Solid,
                rationale: "국가 중요시설 보호를 위해 모든 비행이 금지된 공역입니다. \
                            비행하려면 사전 비행승인이 필요합니다.",
            },
            Self::Restricted => DisplayStyle {
                color: "#f57c00",
                icon: "exclamation-circle",
                border_style: BorderStyle::Solid,
                rationale: "군사 훈련 등으로 비행이 제한되는 공역입니다. \
                            관할 기관의 허가 없이 비행할 수 없습니다.",
            },
            Self::ControlZone => DisplayStyle {
                color: "#1976d2",
                icon: "plane",
                border_style: BorderStyle::Dashed,
                rationale: "비행장 주변 관제권으로 항공기 이착륙 안전을 위해 \
                            관제기관과의 협의가 필요합니다.",
            },
            Self::Danger => DisplayStyle {
                color: "#7b1fa2",
                icon: "exclamation-triangle",
                border_style: BorderStyle::Dashed,
                rationale: "사격장 등 비행 중 위험이 발생할 수 있는 공역입니다.",
            },
            Self::Alert => DisplayStyle {
                color: "#fbc02d",
                icon: "info-circle",
                border_style: BorderStyle::Dotted,
                rationale: "대규모 훈련 등이 이루어지는 공역으로 비행 시 주의가 필요합니다.",
            },
            Self::UltralightCorridor => DisplayStyle {
                color: "#388e3c",
                icon: "paper-plane",
                border_style: BorderStyle::Dotted,
                rationale: "초경량비행장치 비행을 위해 지정된 공역입니다.",
            },
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NoFly,
            Self::Restricted,
            Self::ControlZone,
            Self::Danger,
            Self::Alert,
            Self::UltralightCorridor,
        ]
    }
}

/// One classified taxonomy entry for a feature.
///
/// Built once by the classifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionCategory {
    /// The restriction kind.
    pub kind: RestrictionKind,
    /// Category label (see [`RestrictionKind::label`]).
    pub type_name: &'static str,
    /// Severity tier of the kind.
    pub severity: Severity,
    /// Display metadata of the kind.
    pub style: DisplayStyle,
    /// Identifier of the rule that produced this category, or `"default"`.
    pub rule: &'static str,
    /// Non-empty raw label fields, in `label1..label4` order.
    pub labels: Vec<String>,
}

impl RestrictionCategory {
    /// Creates the category for `kind`.
    #[must_use]
    pub fn new(kind: RestrictionKind, rule: &'static str, labels: Vec<String>) -> Self {
        Self {
            kind,
            type_name: kind.label(),
            severity: kind.severity(),
            style: kind.style(),
            rule,
            labels,
        }
    }
}

/// Attribute fields of an upstream feature that the pipeline reads.
///
/// Every field is optional. Numbers and booleans are accepted and kept in
/// their string form. For text matching an absent field reads as the empty
/// string (see [`ZoneProperties::field_or_empty`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneProperties {
    /// General zone type field.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_typ: Option<String>,
    /// First free-text label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_lbl_1: Option<String>,
    /// Second free-text label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_lbl_2: Option<String>,
    /// Third free-text label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_lbl_3: Option<String>,
    /// Fourth free-text label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_lbl_4: Option<String>,
    /// Prohibited flag / text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prohibited: Option<String>,
    /// Zone name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prh_nam: Option<String>,
    /// Free-text remarks.
    #[serde(default, deserialize_with = "lenient_string")]
    pub rmk: Option<String>,
    /// Altitude limit text (e.g. `"GND~UNL"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub alt_lmt: Option<String>,
}

impl ZoneProperties {
    /// Returns the field's value, or `""` when absent.
    #[must_use]
    pub fn field_or_empty(field: Option<&String>) -> &str {
        field.map_or("", String::as_str)
    }

    /// The zone type field, `""` when absent.
    #[must_use]
    pub fn zone_type(&self) -> &str {
        Self::field_or_empty(self.prh_typ.as_ref())
    }

    /// The prohibited flag field, `""` when absent.
    #[must_use]
    pub fn prohibited_flag(&self) -> &str {
        Self::field_or_empty(self.prohibited.as_ref())
    }

    /// The four label fields in fixed order, absent ones as `""`.
    #[must_use]
    pub fn label_fields(&self) -> [&str; 4] {
        [
            Self::field_or_empty(self.prh_lbl_1.as_ref()),
            Self::field_or_empty(self.prh_lbl_2.as_ref()),
            Self::field_or_empty(self.prh_lbl_3.as_ref()),
            Self::field_or_empty(self.prh_lbl_4.as_ref()),
        ]
    }

    /// Returns the non-empty label fields, raw, in fixed order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.label_fields()
            .into_iter()
            .filter(|label| !label.is_empty())
            .map(String::from)
            .collect()
    }

    /// Display name: the name field, else the first non-blank label, else
    /// `""`. Both are trimmed.
    #[must_use]
    pub fn display_name(&self) -> String {
        std::iter::once(self.prh_nam.as_deref().unwrap_or(""))
            .chain(self.label_fields())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Accepts a JSON string, number, boolean, or null as an optional string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}

/// A representative (latitude, longitude) for a feature geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl CenterPoint {
    /// Creates a center point from `(latitude, longitude)`.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for CenterPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Administrative address for a center point, as returned by a reverse
/// geocoder.
///
/// When resolution fails the geocoder returns a placeholder built by
/// [`AddressInfo::unresolved`]. That is a valid value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    /// Province / metropolitan city (시·도).
    pub province: Option<String>,
    /// District (시·군·구).
    pub district: Option<String>,
    /// Sub-district (읍·면·동).
    pub sub_district: Option<String>,
    /// Display string.
    pub formatted: String,
    /// Whether the geocoder actually resolved the point.
    pub resolved: bool,
}

impl AddressInfo {
    /// Placeholder address carrying only the raw coordinate string.
    #[must_use]
    pub fn unresolved(center: CenterPoint) -> Self {
        Self {
            province: None,
            district: None,
            sub_district: None,
            formatted: center.to_string(),
            resolved: false,
        }
    }

    /// Returns the district when the address was resolved and has one.
    #[must_use]
    pub fn resolved_district(&self) -> Option<&str> {
        if !self.resolved {
            return None;
        }
        self.district
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One classified restriction zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Upstream feature identifier, if provided.
    pub feature_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Remarks text.
    pub description: Option<String>,
    /// Altitude limit text.
    pub altitude_limit: Option<String>,
    /// Representative point. `None` when the geometry was unusable.
    pub center: Option<CenterPoint>,
    /// Classified restriction category.
    pub category: RestrictionCategory,
    /// Resolved (or placeholder) address. `None` without a center.
    pub address: Option<AddressInfo>,
}

/// Aggregate counts over a run's zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of zones folded.
    pub total: u64,
    /// Count by category `type_name`.
    pub by_type: BTreeMap<String, u64>,
    /// Count by severity. Every tier is present.
    pub by_severity: BTreeMap<Severity, u64>,
    /// Count by resolved district name.
    pub by_district: BTreeMap<String, u64>,
}

impl Summary {
    /// A summary of zero zones: all severity tiers at 0.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total: 0,
            by_type: BTreeMap::new(),
            by_severity: Severity::all().iter().map(|s| (*s, 0)).collect(),
            by_district: BTreeMap::new(),
        }
    }

    /// Returns the count for `severity`.
    #[must_use]
    pub fn severity_count(&self, severity: Severity) -> u64 {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::empty()
    }
}
