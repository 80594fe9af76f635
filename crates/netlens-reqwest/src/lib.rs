//! reqwest bindings for netlens.
//!
//! Exposes a [`reqwest::Client`] as a netlens transport so every call made
//! through it is recorded and subject to the debugger's policies.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use netlens_core::{CallContext, HttpTransport, InterceptedClient, NetLens, TimeoutOverrides};

/// Transport that transmits through a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client honouring the connect timeout override.
    ///
    /// reqwest only accepts a connect timeout per client, so this has to be
    /// decided when the transport is created.
    pub fn from_overrides(timeouts: &TimeoutOverrides) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(connect) = timeouts.connect_timeout() {
            builder = builder.connect_timeout(connect);
        }
        Ok(Self::from_client(builder.build()?))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    type Error = reqwest::Error;

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, Self::Error> {
        let timeouts = request
            .extensions()
            .get::<CallContext>()
            .map(CallContext::timeouts)
            .unwrap_or_default();

        let mut outgoing = reqwest::Request::try_from(request)?;
        if let Some(limit) = timeouts.socket_timeout().or(timeouts.request_timeout()) {
            *outgoing.timeout_mut() = Some(limit);
        }
        tracing::trace!(url = %outgoing.url(), method = %outgoing.method(), "sending via reqwest");

        let response = self.client.execute(outgoing).await?;
        into_http_response(response).await
    }
}

async fn into_http_response(response: reqwest::Response) -> Result<Response<Bytes>, reqwest::Error> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    let mut converted = Response::new(body);
    *converted.status_mut() = status;
    *converted.version_mut() = version;
    *converted.headers_mut() = headers;
    Ok(converted)
}

/// Route `client` through the debugger.
pub fn instrument(lens: &NetLens, client: reqwest::Client) -> InterceptedClient<ReqwestTransport> {
    lens.client(ReqwestTransport::from_client(client))
}

/// Instrumented client built from the debugger's current timeout overrides.
pub fn instrumented_client(
    lens: &NetLens,
) -> Result<InterceptedClient<ReqwestTransport>, reqwest::Error> {
    let transport = ReqwestTransport::from_overrides(&lens.config().snapshot().timeouts)?;
    Ok(lens.client(transport))
}
