//! URL pattern matching with a substring fallback for malformed expressions.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Compiled rule patterns kept before the cache is reset.
const RULE_PATTERN_CACHE_LIMIT: usize = 512;

static RULE_PATTERNS: OnceLock<RwLock<HashMap<String, UrlPattern>>> = OnceLock::new();

/// Compiled URL pattern.
///
/// A pattern is a regular expression searched anywhere in the URL. When the
/// expression does not compile it degrades to case-insensitive substring
/// containment, so a typo in a rule never turns into an error for the caller.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    Regex(Regex),
    Substring(String),
}

impl UrlPattern {
    /// Compile a case-sensitive pattern (mock rules).
    pub fn compile(pattern: &str) -> Self {
        Self::build(pattern, false)
    }

    /// Case-sensitive pattern from the process-wide cache, compiled on first use.
    ///
    /// Rules are checked on every call, so their patterns are compiled once.
    pub fn cached(pattern: &str) -> Self {
        let cache = RULE_PATTERNS.get_or_init(Default::default);
        if let Some(hit) = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return hit.clone();
        }

        let compiled = Self::compile(pattern);
        let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() >= RULE_PATTERN_CACHE_LIMIT {
            cache.clear();
        }
        cache.insert(pattern.to_owned(), compiled.clone());
        compiled
    }

    /// Compile a case-insensitive pattern (log filtering).
    pub fn compile_ignore_case(pattern: &str) -> Self {
        Self::build(pattern, true)
    }

    fn build(pattern: &str, ignore_case: bool) -> Self {
        match RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
        {
            Ok(regex) => UrlPattern::Regex(regex),
            Err(err) => {
                tracing::debug!(pattern, error = %err, "invalid url pattern, using substring match");
                UrlPattern::Substring(pattern.to_lowercase())
            }
        }
    }

    pub fn is_match(&self, url: &str) -> bool {
        match self {
            UrlPattern::Regex(regex) => regex.is_match(url),
            UrlPattern::Substring(needle) => url.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// One-shot helper for a single URL check.
pub fn pattern_matches(pattern: &str, url: &str) -> bool {
    UrlPattern::cached(pattern).is_match(url)
}

/// Pattern matching `url` literally, ignoring its query string.
pub fn literal_url_pattern(url: &str) -> String {
    let path = url.split_once('?').map_or(url, |(path, _)| path);
    regex::escape(path)
}
