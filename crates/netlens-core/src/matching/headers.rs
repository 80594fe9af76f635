//! Header snapshots and header text parsing.

use http::HeaderMap;
use std::collections::{BTreeMap, HashMap};

/// Flatten a header map, joining multi-valued headers with `", "`.
pub fn join_header_values(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        result.insert(name.as_str().to_owned(), joined);
    }
    result
}

/// Case-insensitive header presence check on a plain map.
pub fn contains_header(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Parse `Key: Value` lines as typed into a header editor.
///
/// Blank lines and lines without a colon are skipped; keys and values are trimmed.
pub fn parse_header_lines(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
