//! Interception pipeline.
//!
//! [`DebugInterceptor`] provides the outbound and inbound hooks a host client
//! calls around each request. [`InterceptedClient`] wires those hooks around
//! any [`HttpTransport`] so that a host without its own plugin system can be
//! instrumented directly.

mod client;
mod context;
mod error;
mod pipeline;
mod transport;

pub use client::InterceptedClient;
pub use context::{CallContext, CANCELLED_ERROR};
pub use error::{ClientError, InterceptError};
pub use pipeline::{DebugInterceptor, Outbound};
pub use transport::HttpTransport;
