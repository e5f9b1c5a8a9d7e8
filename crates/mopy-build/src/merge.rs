use std::collections::BTreeMap;

/// Union of `defaults` and `overrides`; on a key collision the override wins.
///
/// The result iterates in key order, so anything rendered from it is stable
/// across runs.
pub fn merge(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
