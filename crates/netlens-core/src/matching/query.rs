//! Query string parsing for request snapshots.

use http::Uri;
use std::collections::BTreeMap;

/// Parse a raw query string with URL decoding.
///
/// Repeated keys are joined with `", "` in order of appearance.
pub fn parse_query_string(query_str: &str) -> BTreeMap<String, String> {
    let mut result: BTreeMap<String, String> = BTreeMap::new();

    for pair in query_str.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(raw_key);
        let value = decode(raw_value);

        result
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    result
}

/// Query parameters of a request URI.
pub fn query_params(uri: &Uri) -> BTreeMap<String, String> {
    uri.query().map(parse_query_string).unwrap_or_default()
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
