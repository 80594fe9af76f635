//! Recorded network transactions.

use crate::matching::{join_header_values, query_params};
use bytes::Bytes;
use http::{Request, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder recorded when a body cannot be decoded as text.
pub const UNREADABLE_BODY: &str = "[Binary or unreadable content]";

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lifecycle of one intercepted call.
///
/// Every call starts as `Started` and reaches exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionState {
    Started,
    /// Aborted before transmission by offline mode
    Blocked,
    /// Answered by a response mock, never transmitted
    Mocked,
    Completed,
    Failed,
}

impl TransactionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionState::Started)
    }
}

/// Request side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub body_size: u64,
    /// Epoch milliseconds when the call started
    pub request_time: i64,
}

impl NetworkRequest {
    /// Snapshot an outgoing request as it looks right now.
    pub fn capture(request: &Request<Bytes>, request_time: i64) -> Self {
        Self {
            url: request.uri().to_string(),
            method: request.method().as_str().to_owned(),
            headers: join_header_values(request.headers()),
            query_params: query_params(request.uri()),
            body: body_text(request.body()),
            body_size: request.body().len() as u64,
            request_time,
        }
    }
}

/// Response side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub status_code: u16,
    #[serde(default)]
    pub status_message: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub body_size: u64,
    /// Epoch milliseconds when the response was observed
    pub response_time: i64,
}

impl NetworkResponse {
    pub fn capture(response: &Response<Bytes>, response_time: i64) -> Self {
        let status = response.status();
        Self {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or_default().to_owned(),
            headers: join_header_values(response.headers()),
            body: Some(body_text(response.body()).unwrap_or_default()),
            body_size: response.body().len() as u64,
            response_time,
        }
    }
}

/// Empty bodies are `None`; non UTF-8 payloads become [`UNREADABLE_BODY`].
fn body_text(body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match std::str::from_utf8(body) {
        Ok(text) => Some(text.to_owned()),
        Err(_) => Some(UNREADABLE_BODY.to_owned()),
    }
}

/// One recorded request/response (or request/error) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTransaction {
    pub id: String,
    pub request: NetworkRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<NetworkResponse>,
    /// Epoch milliseconds of the last state change
    pub timestamp: i64,
    /// Milliseconds from start to outcome, `None` while in flight or on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub is_mocked: bool,
    pub state: TransactionState,
}

impl NetworkTransaction {
    /// In-flight transaction for a call that just began.
    pub fn started(id: impl Into<String>, request: NetworkRequest) -> Self {
        let timestamp = request.request_time;
        Self {
            id: id.into(),
            request,
            response: None,
            timestamp,
            duration: None,
            error: None,
            is_mocked: false,
            state: TransactionState::Started,
        }
    }

    /// Attach the outcome of a call that produced a response.
    pub fn completed(self, response: NetworkResponse, duration: u64, mocked: bool) -> Self {
        Self {
            timestamp: response.response_time,
            response: Some(response),
            duration: Some(duration),
            is_mocked: mocked,
            state: if mocked {
                TransactionState::Mocked
            } else {
                TransactionState::Completed
            },
            ..self
        }
    }

    /// Mark the call as failed (or blocked). Response and duration stay empty.
    pub fn failed(self, error: impl Into<String>, state: TransactionState) -> Self {
        Self {
            error: Some(error.into()),
            timestamp: now_millis(),
            state,
            ..self
        }
    }

    pub fn is_in_flight(&self) -> bool {
        !self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use rstest::rstest;

    fn sample_request() -> NetworkRequest {
        let request = Request::builder()
            .method("POST")
            .uri("https://api.test/items?sort=asc")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{\"a\":1}"))
            .expect("valid request");
        NetworkRequest::capture(&request, 1_000)
    }

    #[rstest]
    fn test_capture_request() {
        let captured = sample_request();
        assert_eq!(captured.url, "https://api.test/items?sort=asc");
        assert_eq!(captured.method, "POST");
        assert_eq!(
            captured.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(captured.query_params.get("sort").map(String::as_str), Some("asc"));
        assert_eq!(captured.body.as_deref(), Some("{\"a\":1}"));
        assert_eq!(captured.body_size, 7);
        assert_eq!(captured.request_time, 1_000);
    }

    #[rstest]
    #[case(Bytes::from_static(b"hello"), Some("hello"))]
    #[case(Bytes::from_static(&[0xff, 0xfe, 0x00]), Some(UNREADABLE_BODY))]
    #[case(Bytes::new(), Some(""))]
    fn test_capture_response_body(#[case] body: Bytes, #[case] expected: Option<&str>) {
        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::NOT_FOUND;
        let captured = NetworkResponse::capture(&response, 5);
        assert_eq!(captured.status_code, 404);
        assert_eq!(captured.status_message, "Not Found");
        assert_eq!(captured.body.as_deref(), expected);
    }

    #[rstest]
    fn test_transaction_lifecycle() {
        let started = NetworkTransaction::started("t1", sample_request());
        assert_eq!(started.state, TransactionState::Started);
        assert!(started.is_in_flight());
        assert!(started.response.is_none());
        assert!(started.duration.is_none());

        let response = NetworkResponse::capture(&Response::new(Bytes::from_static(b"ok")), 1_250);
        let done = started.clone().completed(response, 250, false);
        assert_eq!(done.state, TransactionState::Completed);
        assert_eq!(done.duration, Some(250));
        assert_eq!(done.timestamp, 1_250);
        assert!(!done.is_mocked);

        let failed = started.failed("connection refused", TransactionState::Failed);
        assert_eq!(failed.state, TransactionState::Failed);
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
        assert!(failed.response.is_none());
        assert!(failed.duration.is_none());
    }

    #[rstest]
    #[case(TransactionState::Started, false)]
    #[case(TransactionState::Blocked, true)]
    #[case(TransactionState::Mocked, true)]
    #[case(TransactionState::Completed, true)]
    #[case(TransactionState::Failed, true)]
    fn test_state_is_terminal(#[case] state: TransactionState, #[case] expected: bool) {
        assert_eq!(state.is_terminal(), expected);
    }

    #[rstest]
    fn test_transaction_serializes_camel_case() {
        let json = serde_json::to_string(&NetworkTransaction::started("t1", sample_request()))
            .expect("Should serialize");
        assert!(json.contains("\"isMocked\":false"));
        assert!(json.contains("\"queryParams\""));
        assert!(json.contains("\"state\":\"STARTED\""));
        assert!(!json.contains("\"response\""));
    }
}
