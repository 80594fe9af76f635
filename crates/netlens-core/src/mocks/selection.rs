//! Rule selection and synthetic responses.

use crate::matching::contains_header;
use crate::mocks::rules::{MockRule, RequestMock, ResponseMock};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, Version};

/// First enabled response mock matching the call, in list order.
pub fn select_response_mock<'a>(
    mocks: &'a [ResponseMock],
    url: &str,
    method: &str,
) -> Option<&'a ResponseMock> {
    mocks.iter().find(|mock| mock.matches(url, method))
}

/// Every enabled request mock matching the call, in list order.
pub fn matching_request_mocks<'a>(
    mocks: &'a [RequestMock],
    url: &str,
    method: &str,
) -> impl Iterator<Item = &'a RequestMock> + 'a {
    let url = url.to_owned();
    let method = method.to_owned();
    mocks
        .iter()
        .filter(move |mock| mock.matches(&url, &method))
}

/// Append a header, skipping names or values that are not valid HTTP.
///
/// Returns `false` when the pair was skipped.
pub(crate) fn append_header(headers: &mut HeaderMap, name: &str, value: &str) -> bool {
    match parse_header(name, value) {
        Some((name, value)) => {
            headers.append(name, value);
            true
        }
        None => false,
    }
}

/// Set a header, replacing earlier values so that single-value readers see this one.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> bool {
    match parse_header(name, value) {
        Some((name, value)) => {
            headers.insert(name, value);
            true
        }
        None => false,
    }
}

fn parse_header(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let parsed = HeaderName::from_bytes(name.as_bytes())
        .ok()
        .zip(HeaderValue::from_str(value).ok());
    if parsed.is_none() {
        tracing::warn!(header = name, "skipping invalid header override");
    }
    parsed
}

/// Build the response returned in place of a real network call.
///
/// The mock's header overrides form the full header set; a content length and
/// a JSON content type are added when the overrides do not provide them.
pub fn build_mock_response(mock: &ResponseMock) -> Response<Bytes> {
    let body = Bytes::from(mock.body().to_owned());

    let status = StatusCode::from_u16(mock.status()).unwrap_or_else(|_| {
        tracing::warn!(mock_id = %mock.id, status = mock.status(), "invalid mock status, using 200");
        StatusCode::OK
    });

    let mut headers = HeaderMap::new();
    for (name, value) in &mock.header_overrides {
        append_header(&mut headers, name, value);
    }
    if !contains_header(&mock.header_overrides, CONTENT_LENGTH.as_str()) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    if !contains_header(&mock.header_overrides, CONTENT_TYPE.as_str()) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = Version::HTTP_11;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_select_response_mock_first_match_wins() {
        let mut mocks = vec![
            ResponseMock::new("disabled", "/users").with_status(500),
            ResponseMock::new("first", "/users").with_status(201),
            ResponseMock::new("second", "/users/\\d+").with_status(202),
        ];
        mocks[0].is_enabled = false;

        let selected = select_response_mock(&mocks, "https://api.test/users/1", "GET");
        assert_eq!(selected.map(|m| m.id.as_str()), Some("first"));
    }

    #[rstest]
    #[case("https://api.test/orders", "GET", None)]
    #[case("https://api.test/users", "DELETE", None)]
    #[case("https://api.test/users", "post", Some("post-only"))]
    fn test_select_response_mock_by_method(
        #[case] url: &str,
        #[case] method: &str,
        #[case] expected: Option<&str>,
    ) {
        let mocks = vec![ResponseMock::new("post-only", "/users").with_method("POST")];
        let selected = select_response_mock(&mocks, url, method);
        assert_eq!(selected.map(|m| m.id.as_str()), expected);
    }

    #[rstest]
    fn test_matching_request_mocks_returns_all() {
        let mocks = vec![
            RequestMock::new("a", "/users").with_header("X-A", "1"),
            RequestMock::new("b", "api\\.test").with_header("X-B", "2"),
            RequestMock::new("c", "/orders").with_header("X-C", "3"),
        ];
        let ids: Vec<&str> = matching_request_mocks(&mocks, "https://api.test/users", "GET")
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[rstest]
    fn test_build_mock_response_defaults() {
        let response = build_mock_response(&ResponseMock::new("m1", "/x"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"");
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[rstest]
    fn test_build_mock_response_overrides() {
        let mock = ResponseMock::new("m1", "/x")
            .with_status(503)
            .with_body("{\"e\":1}")
            .with_header("Content-Type", "text/plain")
            .with_header("X-Mock", "yes");
        let response = build_mock_response(&mock);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body().as_ref(), b"{\"e\":1}");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()["x-mock"], "yes");
        assert_eq!(response.headers()[CONTENT_LENGTH], "7");
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[rstest]
    #[case("bad header", "v", false)]
    #[case("X-Ok", "line\nbreak", false)]
    #[case("X-Ok", "fine", true)]
    fn test_append_header(#[case] name: &str, #[case] value: &str, #[case] expected: bool) {
        let mut headers = HeaderMap::new();
        assert_eq!(append_header(&mut headers, name, value), expected);
        assert_eq!(headers.len(), usize::from(expected));
    }

    #[rstest]
    fn test_insert_header_replaces_appended_values() {
        let mut headers = HeaderMap::new();
        append_header(&mut headers, "X-Env", "global");
        append_header(&mut headers, "X-Env", "again");
        assert!(insert_header(&mut headers, "x-env", "override"));
        assert_eq!(headers["x-env"], "override");
        assert_eq!(headers.get_all("x-env").iter().count(), 1);
    }
}
