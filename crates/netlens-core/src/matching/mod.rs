//! URL, header and query helpers shared by mock rules and the transaction log.

mod headers;
mod pattern;
mod query;

pub use headers::{contains_header, join_header_values, parse_header_lines};
pub use pattern::{literal_url_pattern, pattern_matches, UrlPattern};
pub use query::{parse_query_string, query_params};
