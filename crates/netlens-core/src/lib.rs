//! Core library for netlens, an in-app network debugger.
//!
//! The crate sits in the request/response path of a host HTTP client and
//! records every call into a bounded [`TransactionLog`], while applying the
//! policies held by a [`ConfigStore`]: offline mode, throttling, global
//! headers, request header overrides and full response mocking.
//!
//! ```ignore
//! let lens = NetLens::new();
//! lens.config().set_throttle(250);
//! let client = lens.client(my_transport);
//! let response = client.execute(request).await?;
//! let calls = lens.log().filter_by_pattern("/users");
//! ```

pub mod config;
pub mod curl;
pub mod interceptor;
pub mod matching;
pub mod mocks;
pub mod transactions;
pub mod types;

use std::sync::Arc;

pub use config::{
    ConfigError, ConfigStore, FilePreferences, MemoryPreferences, PreferencesError,
    PreferencesStore,
};
pub use interceptor::{
    CallContext, ClientError, DebugInterceptor, HttpTransport, InterceptError, InterceptedClient,
    Outbound,
};
pub use mocks::{MockRule, MockSet, RequestMock, ResponseMock};
pub use transactions::{TransactionLog, DEFAULT_LOG_CAPACITY};
pub use types::{
    DebugConfig, Environment, EnvironmentConfig, NetworkRequest, NetworkResponse,
    NetworkTransaction, TimeoutOverrides, TransactionState,
};

/// Process-scoped bundle of the configuration store and transaction log.
///
/// Construct one at application start and hand clones of the shared handles to
/// the interceptor and to whatever presentation layer reads the state.
#[derive(Debug, Clone)]
pub struct NetLens {
    config: Arc<ConfigStore>,
    log: Arc<TransactionLog>,
}

impl NetLens {
    /// Create a debugger with in-memory preferences.
    pub fn new() -> Self {
        Self::from_parts(Arc::new(ConfigStore::new()), Arc::new(TransactionLog::new()))
    }

    /// Create a debugger whose environment selection persists through `preferences`.
    pub fn with_preferences(preferences: Arc<dyn PreferencesStore>) -> Self {
        let config = ConfigStore::with_preferences(preferences);
        config.load_persisted_config();
        Self::from_parts(Arc::new(config), Arc::new(TransactionLog::new()))
    }

    pub fn from_parts(config: Arc<ConfigStore>, log: Arc<TransactionLog>) -> Self {
        Self { config, log }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn log(&self) -> &Arc<TransactionLog> {
        &self.log
    }

    /// Interceptor sharing this debugger's state.
    pub fn interceptor(&self) -> DebugInterceptor {
        DebugInterceptor::new(Arc::clone(&self.config), Arc::clone(&self.log))
    }

    /// Wrap a host transport so every call goes through the interceptor.
    pub fn client<T: HttpTransport>(&self, transport: T) -> InterceptedClient<T> {
        InterceptedClient::new(self.interceptor(), transport)
    }
}

impl Default for NetLens {
    fn default() -> Self {
        Self::new()
    }
}
