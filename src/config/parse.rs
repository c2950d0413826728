//! Parsing of loosely formatted environment strings.

use std::collections::BTreeMap;

/// Parse a comma-separated list of `key=value` pairs.
///
/// Each entry is trimmed and split on its first `=` only, so values may
/// themselves contain `=` (`region=ar=ba` gives `region` -> `ar=ba`).
/// Entries without `=`, with an empty key, or with an empty value are
/// dropped. Later duplicates overwrite earlier ones.
pub fn parse_delimited_pairs(raw: Option<&str>) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    let Some(raw) = raw else {
        return pairs;
    };

    for entry in raw.split(',') {
        let Some((key, value)) = entry.trim().split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        pairs.insert(key.to_string(), value.to_string());
    }

    pairs
}

/// Interpret a boolean-ish flag. `None` when unset or unrecognised.
pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
