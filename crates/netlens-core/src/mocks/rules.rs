//! Mock rule definitions.

use crate::matching::{literal_url_pattern, UrlPattern};
use crate::types::NetworkTransaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

fn default_enabled() -> bool {
    true
}

/// Shared matching behaviour of request and response mocks.
pub trait MockRule {
    fn url_pattern(&self) -> &str;

    /// Required method, `None` matches any method
    fn method(&self) -> Option<&str>;

    fn is_enabled(&self) -> bool;

    /// A rule matches when it is enabled, the URL pattern matches and the
    /// method (if any) equals the request method ignoring case.
    fn matches(&self, url: &str, method: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let method_matches = self
            .method()
            .map_or(true, |expected| expected.eq_ignore_ascii_case(method));

        method_matches && UrlPattern::cached(self.url_pattern()).is_match(url)
    }
}

/// Header injection rule for outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMock {
    pub id: String,
    /// Regex searched in the full URL; invalid regex falls back to substring
    pub url_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub header_overrides: HashMap<String, String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

impl RequestMock {
    pub fn new(id: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url_pattern: url_pattern.into(),
            method: None,
            header_overrides: HashMap::new(),
            is_enabled: true,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_overrides.insert(name.into(), value.into());
        self
    }

    /// Rule targeting the URL (query ignored) and method of a recorded call.
    pub fn from_transaction(
        id: impl Into<String>,
        transaction: &NetworkTransaction,
        header_overrides: HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            url_pattern: literal_url_pattern(&transaction.request.url),
            method: Some(transaction.request.method.clone()),
            header_overrides,
            is_enabled: true,
        }
    }
}

impl MockRule for RequestMock {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }
}

/// Full response substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMock {
    pub id: String,
    pub url_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Defaults to 200 when the rule is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub header_overrides: HashMap<String, String>,
    /// Defaults to an empty body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_override: Option<String>,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

impl ResponseMock {
    pub const DEFAULT_STATUS: u16 = 200;

    pub fn new(id: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url_pattern: url_pattern.into(),
            method: None,
            status_code: None,
            header_overrides: HashMap::new(),
            body_override: None,
            delay_ms: 0,
            is_enabled: true,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_overrides.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_override = Some(body.into());
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn status(&self) -> u16 {
        self.status_code.unwrap_or(Self::DEFAULT_STATUS)
    }

    pub fn body(&self) -> &str {
        self.body_override.as_deref().unwrap_or_default()
    }

    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }

    /// Two response mocks with the same pattern and method cannot coexist.
    pub fn same_target(&self, other: &ResponseMock) -> bool {
        self.url_pattern == other.url_pattern && self.method == other.method
    }

    /// Rule replaying a recorded response for the same URL (query stripped) and method.
    pub fn from_transaction(id: impl Into<String>, transaction: &NetworkTransaction) -> Self {
        let response = transaction.response.as_ref();

        Self {
            id: id.into(),
            url_pattern: literal_url_pattern(&transaction.request.url),
            method: Some(transaction.request.method.clone()),
            status_code: Some(response.map_or(Self::DEFAULT_STATUS, |r| r.status_code)),
            header_overrides: HashMap::new(),
            body_override: response
                .and_then(|r| r.body.clone())
                .filter(|body| !body.trim().is_empty()),
            delay_ms: 0,
            is_enabled: true,
        }
    }
}

impl MockRule for ResponseMock {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }
}

/// Bundle of rules as stored in a mock file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockSet {
    pub request_mocks: Vec<RequestMock>,
    pub response_mocks: Vec<ResponseMock>,
    pub global_headers: HashMap<String, String>,
}

impl MockSet {
    pub fn is_empty(&self) -> bool {
        self.request_mocks.is_empty()
            && self.response_mocks.is_empty()
            && self.global_headers.is_empty()
    }

    /// Merge another set into this one, later entries after earlier ones.
    pub fn extend(&mut self, other: MockSet) {
        self.request_mocks.extend(other.request_mocks);
        self.response_mocks.extend(other.response_mocks);
        self.global_headers.extend(other.global_headers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NetworkRequest, NetworkResponse};
    use rstest::rstest;
    use std::collections::BTreeMap;

    #[rstest]
    #[case(None, "GET", true)]
    #[case(Some("GET"), "GET", true)]
    #[case(Some("get"), "GET", true)]
    #[case(Some("POST"), "GET", false)]
    fn test_method_matching(
        #[case] method: Option<&str>,
        #[case] request_method: &str,
        #[case] expected: bool,
    ) {
        let mut mock = ResponseMock::new("m1", "/x");
        mock.method = method.map(str::to_owned);
        assert_eq!(mock.matches("https://api.test/x", request_method), expected);
    }

    #[rstest]
    #[case("/x", "https://api.test/x", true)]
    #[case("/y", "https://api.test/x", false)]
    #[case("[", "https://api.test/x[1]", true)]
    fn test_request_mock_url_matching(
        #[case] pattern: &str,
        #[case] url: &str,
        #[case] expected: bool,
    ) {
        let mock = RequestMock::new("r1", pattern).with_header("X-Test", "1");
        assert_eq!(mock.matches(url, "GET"), expected);
    }

    #[rstest]
    fn test_disabled_mock_never_matches() {
        let mut mock = ResponseMock::new("m1", ".*");
        mock.is_enabled = false;
        assert!(!mock.matches("https://api.test/x", "GET"));

        let mut request_mock = RequestMock::new("r1", ".*");
        request_mock.is_enabled = false;
        assert!(!request_mock.matches("https://api.test/x", "GET"));
    }

    #[rstest]
    fn test_response_mock_defaults() {
        let mock = ResponseMock::new("m1", "/x");
        assert_eq!(mock.status(), 200);
        assert_eq!(mock.body(), "");
        assert_eq!(mock.delay(), None);

        let mock = mock.with_status(503).with_body("{\"e\":1}").with_delay(40);
        assert_eq!(mock.status(), 503);
        assert_eq!(mock.body(), "{\"e\":1}");
        assert_eq!(mock.delay(), Some(Duration::from_millis(40)));
    }

    #[rstest]
    #[case("/x", Some("GET"), "/x", Some("GET"), true)]
    #[case("/x", None, "/x", None, true)]
    #[case("/x", Some("GET"), "/x", Some("POST"), false)]
    #[case("/x", None, "/x", Some("GET"), false)]
    #[case("/x", None, "/y", None, false)]
    fn test_same_target(
        #[case] pattern_a: &str,
        #[case] method_a: Option<&str>,
        #[case] pattern_b: &str,
        #[case] method_b: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut a = ResponseMock::new("a", pattern_a);
        a.method = method_a.map(str::to_owned);
        let mut b = ResponseMock::new("b", pattern_b);
        b.method = method_b.map(str::to_owned);
        assert_eq!(a.same_target(&b), expected);
    }

    #[rstest]
    fn test_response_mock_deserialize_defaults() {
        let mock: ResponseMock =
            serde_json::from_str(r#"{"id": "m1", "urlPattern": "/x"}"#).expect("Should deserialize");
        assert!(mock.is_enabled);
        assert_eq!(mock.delay_ms, 0);
        assert_eq!(mock.status_code, None);
        assert!(mock.header_overrides.is_empty());
    }

    fn recorded(body: Option<&str>) -> NetworkTransaction {
        let request = NetworkRequest {
            url: "https://api.test/items?page=2".to_owned(),
            method: "GET".to_owned(),
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body: None,
            body_size: 0,
            request_time: 10,
        };
        let response = NetworkResponse {
            status_code: 404,
            status_message: "Not Found".to_owned(),
            headers: BTreeMap::new(),
            body: body.map(str::to_owned),
            body_size: 0,
            response_time: 20,
        };
        NetworkTransaction::started("t1", request).completed(response, 10, false)
    }

    #[rstest]
    fn test_response_mock_from_transaction() {
        let mock = ResponseMock::from_transaction("m1", &recorded(Some("{\"missing\":true}")));
        assert_eq!(mock.url_pattern, r"https://api\.test/items");
        assert!(mock.matches("https://api.test/items?page=2", "GET"));
        assert_eq!(mock.method.as_deref(), Some("GET"));
        assert_eq!(mock.status_code, Some(404));
        assert_eq!(mock.body_override.as_deref(), Some("{\"missing\":true}"));

        let blank = ResponseMock::from_transaction("m2", &recorded(Some("  ")));
        assert_eq!(blank.body_override, None);
    }

    #[rstest]
    fn test_request_mock_from_transaction() {
        let headers = HashMap::from([("X-Debug".to_owned(), "1".to_owned())]);
        let mock = RequestMock::from_transaction("r1", &recorded(None), headers.clone());
        assert_eq!(mock.url_pattern, r"https://api\.test/items");
        assert_eq!(mock.method.as_deref(), Some("GET"));
        assert_eq!(mock.header_overrides, headers);
    }

    #[rstest]
    #[case("https://api.test/items?page=2", "https://api.test/items?page=2", true)]
    #[case("https://api.test/items?page=2", "https://api.test/items?page=3", true)]
    #[case("https://api.test/search(v2)?q=a+b", "https://api.test/search(v2)?q=c", true)]
    #[case("https://api.test/v1.0/items", "https://api.test/v1x0/items", false)]
    fn test_rules_from_transaction_match_their_call(
        #[case] recorded_url: &str,
        #[case] url: &str,
        #[case] expected: bool,
    ) {
        let mut transaction = recorded(None);
        transaction.request.url = recorded_url.to_owned();

        let request_mock = RequestMock::from_transaction("r1", &transaction, HashMap::new());
        let response_mock = ResponseMock::from_transaction("m1", &transaction);

        assert_eq!(request_mock.matches(url, "GET"), expected);
        assert_eq!(response_mock.matches(url, "get"), expected);
    }

    #[rstest]
    fn test_mock_set_extend() {
        let mut set = MockSet::default();
        assert!(set.is_empty());
        set.extend(MockSet {
            request_mocks: vec![RequestMock::new("r1", "/a")],
            response_mocks: vec![ResponseMock::new("m1", "/b")],
            global_headers: HashMap::from([("X-App".to_owned(), "demo".to_owned())]),
        });
        assert!(!set.is_empty());
        assert_eq!(set.request_mocks.len(), 1);
        assert_eq!(set.response_mocks.len(), 1);
    }
}
