//! Dataset registry: loads airspace dataset definitions from embedded TOML.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a dataset means
//! creating a TOML file and adding it to the list below.

use airzone_source_models::DatasetDefinition;

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("prohibited", include_str!("../datasets/prohibited.toml")),
    ("restricted", include_str!("../datasets/restricted.toml")),
    ("danger", include_str!("../datasets/danger.toml")),
    ("control_zone", include_str!("../datasets/control_zone.toml")),
    ("alert", include_str!("../datasets/alert.toml")),
    ("ultralight", include_str!("../datasets/ultralight.toml")),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 6;

/// Identifier of the dataset used when the caller does not pick one.
pub const DEFAULT_DATASET_ID: &str = "prohibited";

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
}

/// Returns only the datasets enabled by default.
#[must_use]
pub fn enabled_datasets() -> Vec<DatasetDefinition> {
    all_datasets().into_iter().filter(|d| d.enabled).collect()
}

/// Looks up a dataset by its short id or its upstream dataset code.
#[must_use]
pub fn find_dataset(id_or_code: &str) -> Option<DatasetDefinition> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id_or_code || d.dataset.eq_ignore_ascii_case(id_or_code))
}
