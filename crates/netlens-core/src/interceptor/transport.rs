use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use std::sync::Arc;

/// The host client's transmission step.
///
/// Implementations perform the real network call. The request extensions carry
/// the [`CallContext`](super::CallContext) of the call, which exposes the
/// connect and socket timeout overrides.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, Self::Error>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    type Error = T::Error;

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, Self::Error> {
        (**self).send(request).await
    }
}
