use crate::interceptor::context::CallContext;
use crate::interceptor::error::ClientError;
use crate::interceptor::pipeline::{DebugInterceptor, Outbound};
use crate::interceptor::transport::HttpTransport;
use bytes::Bytes;
use http::{Request, Response};

/// A transport wrapped by the interception pipeline.
///
/// Each [`execute`](Self::execute) runs the outbound hook, transmits unless a
/// mock answered, then reports the outcome through the inbound or failure hook.
#[derive(Debug, Clone)]
pub struct InterceptedClient<T> {
    interceptor: DebugInterceptor,
    transport: T,
}

impl<T: HttpTransport> InterceptedClient<T> {
    pub fn new(interceptor: DebugInterceptor, transport: T) -> Self {
        Self {
            interceptor,
            transport,
        }
    }

    pub fn interceptor(&self) -> &DebugInterceptor {
        &self.interceptor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` through the pipeline.
    ///
    /// A non-zero request timeout override bounds the transmission wait.
    /// Transport errors are returned unchanged inside [`ClientError::Transport`].
    pub async fn execute(
        &self,
        mut request: Request<Bytes>,
    ) -> Result<Response<Bytes>, ClientError<T::Error>> {
        if let Outbound::ShortCircuit(response) = self.interceptor.on_request(&mut request).await? {
            return Ok(response);
        }

        let context = request.extensions().get::<CallContext>().cloned();
        let timeouts = context.as_ref().map(CallContext::timeouts).unwrap_or_default();

        let sent = match timeouts.request_timeout() {
            Some(limit) => match tokio::time::timeout(limit, self.transport.send(request)).await {
                Ok(result) => result.map_err(ClientError::Transport),
                Err(_) => {
                    tracing::debug!(timeout_ms = timeouts.request_ms, "request timeout override hit");
                    Err(ClientError::Timeout(timeouts.request_ms))
                }
            },
            None => self
                .transport
                .send(request)
                .await
                .map_err(ClientError::Transport),
        };

        match sent {
            Ok(mut response) => {
                if let Some(context) = context {
                    response.extensions_mut().insert(context);
                }
                self.interceptor.on_response(&response);
                Ok(response)
            }
            Err(err) => {
                self.interceptor.on_failure(context.as_ref(), &err.to_string());
                Err(err)
            }
        }
    }
}
