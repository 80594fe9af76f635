//! Outbound and inbound hooks of the interception pipeline.

use crate::config::ConfigStore;
use crate::interceptor::context::CallContext;
use crate::interceptor::error::InterceptError;
use crate::mocks::selection::{append_header, insert_header};
use crate::mocks::{build_mock_response, matching_request_mocks, select_response_mock};
use crate::transactions::TransactionLog;
use crate::types::{
    now_millis, DebugConfig, NetworkRequest, NetworkResponse, NetworkTransaction,
    TransactionState,
};
use bytes::Bytes;
use http::{Request, Response};
use std::sync::Arc;
use uuid::Uuid;

/// What the host client should do after the outbound phase.
#[derive(Debug)]
pub enum Outbound {
    /// Transmit the (possibly modified) request and report the outcome
    /// through [`DebugInterceptor::on_response`] or [`DebugInterceptor::on_failure`].
    Forward,
    /// Return this response to the caller without transmitting.
    ShortCircuit(Response<Bytes>),
}

/// Hook pair installed into a host HTTP client.
///
/// [`on_request`](Self::on_request) runs once per call before transmission and
/// stores a [`CallContext`] in the request extensions. The host copies that
/// context to the response extensions (or keeps it aside for the failure path)
/// so the inbound hook can find the transaction it belongs to.
#[derive(Debug, Clone)]
pub struct DebugInterceptor {
    config: Arc<ConfigStore>,
    log: Arc<TransactionLog>,
}

impl DebugInterceptor {
    pub fn new(config: Arc<ConfigStore>, log: Arc<TransactionLog>) -> Self {
        Self { config, log }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn log(&self) -> &Arc<TransactionLog> {
        &self.log
    }

    /// Outbound phase.
    ///
    /// Policies apply in a fixed order: offline check, throttle, response mock
    /// selection and delay, header injection, then short-circuit or forward.
    pub async fn on_request(
        &self,
        request: &mut Request<Bytes>,
    ) -> Result<Outbound, InterceptError> {
        let config = self.config.snapshot();
        let transaction_id = Uuid::new_v4().to_string();
        let started_at = now_millis();

        let captured = NetworkRequest::capture(request, started_at);
        let url = captured.url.clone();
        let method = captured.method.clone();

        let mut context = CallContext::new(
            transaction_id.clone(),
            started_at,
            config.timeouts,
            Arc::clone(&self.log),
        );
        self.log
            .record(NetworkTransaction::started(&transaction_id, captured));
        tracing::debug!(%transaction_id, %url, %method, "call started");

        if config.offline_mode {
            let error = InterceptError::Offline;
            self.log.update(&transaction_id, |t| {
                t.failed(error.to_string(), TransactionState::Blocked)
            });
            context.settle();
            tracing::info!(%transaction_id, %url, "call blocked by offline mode");
            return Err(error);
        }

        if let Some(throttle) = config.throttle() {
            tracing::debug!(%transaction_id, throttle_ms = config.throttle_ms, "throttling call");
            tokio::time::sleep(throttle).await;
        }

        let mock = if config.mocking_active() {
            select_response_mock(&config.response_mocks, &url, &method)
        } else {
            None
        };
        if let Some(mock) = mock {
            context.set_mocked_by(&mock.id);
            if let Some(delay) = mock.delay() {
                tokio::time::sleep(delay).await;
            }
        }

        if config.enabled {
            inject_headers(request, &config, &url, &method);
        }

        let Some(mock) = mock else {
            request.extensions_mut().insert(context);
            return Ok(Outbound::Forward);
        };

        let mut response = build_mock_response(mock);
        let recorded = NetworkResponse::capture(&response, now_millis());
        let duration = context.elapsed_ms();
        self.log
            .update(&transaction_id, |t| t.completed(recorded, duration, true));
        context.settle();
        tracing::info!(%transaction_id, mock_id = %mock.id, %url, "call answered by response mock");

        response.extensions_mut().insert(context.clone());
        request.extensions_mut().insert(context);
        Ok(Outbound::ShortCircuit(response))
    }

    /// Inbound phase for a call that was actually transmitted.
    ///
    /// Reads the [`CallContext`] from the response extensions. Calls already
    /// settled (answered by a mock) are left untouched.
    pub fn on_response(&self, response: &Response<Bytes>) {
        let context = response.extensions().get::<CallContext>();
        if context.is_some_and(CallContext::is_settled) {
            return;
        }

        let (transaction_id, duration) = match context {
            Some(context) => (context.transaction_id().to_owned(), context.elapsed_ms()),
            None => {
                tracing::warn!("response without call context, recording under a new id");
                (Uuid::new_v4().to_string(), 0)
            }
        };

        let recorded = NetworkResponse::capture(response, now_millis());
        let status = recorded.status_code;
        self.log
            .update(&transaction_id, |t| t.completed(recorded, duration, false));
        if let Some(context) = context {
            context.settle();
        }
        tracing::debug!(%transaction_id, status, duration_ms = duration, "call completed");
    }

    /// Failure path for a call whose transmission failed.
    pub fn on_failure(&self, context: Option<&CallContext>, error: &str) {
        let Some(context) = context else {
            tracing::warn!(error, "call failed without call context");
            return;
        };
        if context.is_settled() {
            return;
        }

        self.log.update(context.transaction_id(), |t| {
            t.failed(error, TransactionState::Failed)
        });
        context.settle();
        tracing::debug!(transaction_id = context.transaction_id(), error, "call failed");
    }
}

/// Global headers first, then every matching request mock's overrides.
///
/// Overrides replace earlier values of the same header, so the last matching
/// rule is what single-value readers see.
fn inject_headers(request: &mut Request<Bytes>, config: &DebugConfig, url: &str, method: &str) {
    let headers = request.headers_mut();
    for (name, value) in &config.global_headers {
        append_header(headers, name, value);
    }
    for mock in matching_request_mocks(&config.request_mocks, url, method) {
        for (name, value) in &mock.header_overrides {
            insert_header(headers, name, value);
        }
    }
}
