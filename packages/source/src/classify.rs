//! Restriction classification.
//!
//! Maps the attribute fields of an upstream feature to the canonical
//! [`RestrictionKind`] taxonomy. The data API labels zones with a mix of
//! Korean administrative names, regulatory keywords, and airspace codes
//! (`P-73`, `R-75`, `UA-14`, ...), so classification is an ordered table
//! of rules evaluated top to bottom. The first matching rule wins.
//!
//! Keywords match anywhere in a field. Airspace codes only match as a
//! code: at the start of a word and followed by a digit, so `R-75`
//! matches but `CTR-GIMPO` and `GND-3000FT` do not.
//!
//! Specific rules must stay above broad ones: an airspace code rule placed
//! after the generic "금지" rule would never be reached for a feature that
//! carries both.

use airzone_zone_models::{RestrictionCategory, RestrictionKind, ZoneProperties};

/// Which attribute fields a rule inspects, and the tokens it looks for.
///
/// Matching is case-sensitive. Absent fields read as the empty string and
/// never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Any of the four label fields contains a token.
    LabelContains(&'static [&'static str]),
    /// The zone type field contains a token.
    ZoneTypeContains(&'static [&'static str]),
    /// The prohibited flag field contains a token.
    ProhibitedContains(&'static [&'static str]),
    /// The zone type, any label, or the prohibited field contains a token.
    AnyFieldContains(&'static [&'static str]),
    /// The zone type, any label, or the prohibited field carries one of
    /// `codes` (see [`has_code`]) or contains one of `keywords`.
    CodeOrKeyword {
        /// Airspace code prefixes, e.g. `"R-"`.
        codes: &'static [&'static str],
        /// Plain substrings.
        keywords: &'static [&'static str],
    },
}

impl Predicate {
    /// Returns `true` if `props` satisfies this predicate.
    #[must_use]
    pub fn matches(self, props: &ZoneProperties) -> bool {
        match self {
            Self::LabelContains(tokens) => props
                .label_fields()
                .iter()
                .any(|label| contains_any(label, tokens)),
            Self::ZoneTypeContains(tokens) => contains_any(props.zone_type(), tokens),
            Self::ProhibitedContains(tokens) => contains_any(props.prohibited_flag(), tokens),
            Self::AnyFieldContains(tokens) => {
                Self::ZoneTypeContains(tokens).matches(props)
                    || Self::LabelContains(tokens).matches(props)
                    || Self::ProhibitedContains(tokens).matches(props)
            }
            Self::CodeOrKeyword { codes, keywords } => {
                let [l1, l2, l3, l4] = props.label_fields();
                [props.zone_type(), l1, l2, l3, l4, props.prohibited_flag()]
                    .into_iter()
                    .any(|field| has_code(field, codes) || contains_any(field, keywords))
            }
        }
    }
}

/// One entry of the classification cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier, recorded on the produced category.
    pub id: &'static str,
    /// What must match.
    pub predicate: Predicate,
    /// Kind assigned on match.
    pub kind: RestrictionKind,
}

/// Rule id recorded when nothing matched.
pub const DEFAULT_RULE_ID: &str = "default";

/// Kind assigned when nothing matched. Unrecognized zones are treated as
/// no-fly.
pub const DEFAULT_KIND: RestrictionKind = RestrictionKind::NoFly;

/// The classification cascade, in evaluation order.
pub const RULES: &[Rule] = &[
    // ── Named airspace codes ────────────────────────────────────────
    Rule {
        id: "p73",
        predicate: Predicate::CodeOrKeyword {
            codes: &["P-73", "P73"],
            keywords: &[],
        },
        kind: RestrictionKind::NoFly,
    },
    Rule {
        id: "ultralight_code",
        predicate: Predicate::CodeOrKeyword {
            codes: &["UA-", "UA "],
            keywords: &["초경량"],
        },
        kind: RestrictionKind::UltralightCorridor,
    },
    Rule {
        id: "restricted_code",
        predicate: Predicate::CodeOrKeyword {
            codes: &["R-"],
            keywords: &["비행제한", "제한구역"],
        },
        kind: RestrictionKind::Restricted,
    },
    Rule {
        id: "danger_code",
        predicate: Predicate::CodeOrKeyword {
            codes: &["D-"],
            keywords: &["위험"],
        },
        kind: RestrictionKind::Danger,
    },
    Rule {
        id: "alert_code",
        predicate: Predicate::CodeOrKeyword {
            codes: &["A-"],
            keywords: &["경계"],
        },
        kind: RestrictionKind::Alert,
    },
    // ── Administrative categories ───────────────────────────────────
    Rule {
        id: "control_zone",
        predicate: Predicate::AnyFieldContains(&["관제"]),
        kind: RestrictionKind::ControlZone,
    },
    // ── Generic prohibition keywords ────────────────────────────────
    Rule {
        id: "prohibited_label",
        predicate: Predicate::LabelContains(&["금지"]),
        kind: RestrictionKind::NoFly,
    },
    Rule {
        id: "prohibited_flag",
        predicate: Predicate::ProhibitedContains(&["금지", "Y", "1"]),
        kind: RestrictionKind::NoFly,
    },
    Rule {
        id: "prohibited_type",
        predicate: Predicate::ZoneTypeContains(&["금지"]),
        kind: RestrictionKind::NoFly,
    },
];

/// Returns the first rule in [`RULES`] that `props` satisfies.
#[must_use]
pub fn matching_rule(props: &ZoneProperties) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.predicate.matches(props))
}

/// Classifies a feature's properties into a restriction category.
///
/// Always returns a category: when no rule matches, the category is
/// [`DEFAULT_KIND`] with rule id [`DEFAULT_RULE_ID`]. The category's
/// labels are the non-empty label fields regardless of which rule
/// matched.
#[must_use]
pub fn classify(props: &ZoneProperties) -> RestrictionCategory {
    let (rule_id, kind) =
        matching_rule(props).map_or((DEFAULT_RULE_ID, DEFAULT_KIND), |rule| (rule.id, rule.kind));

    RestrictionCategory::new(kind, rule_id, props.labels())
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    !haystack.is_empty() && needles.iter().any(|needle| haystack.contains(needle))
}

/// Checks if `haystack` carries any of `codes` as an airspace code.
///
/// An occurrence counts only when it starts a word (no ASCII letter or
/// digit right before it) and is followed by a digit. Codes that already
/// end in a digit, like `P-73`, need no digit after them.
#[must_use]
pub fn has_code(haystack: &str, codes: &[&str]) -> bool {
    codes.iter().any(|code| {
        let needs_digit = !code.ends_with(|c: char| c.is_ascii_digit());
        haystack.match_indices(code).any(|(start, _)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[start + code.len()..].chars().next();
            !before.is_some_and(|c| c.is_ascii_alphanumeric())
                && (!needs_digit || after.is_some_and(|c| c.is_ascii_digit()))
        })
    })
}
